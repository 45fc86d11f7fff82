//! Image loading and data URI handling.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// MIME type assumed when nothing better is known.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// Guess the MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        _ => DEFAULT_MIME,
    }
}

/// Read an image file into a `data:<mime>;base64,...` URI.
pub fn load_image_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image: {}", path.display()))?;

    if bytes.is_empty() {
        bail!("Image file is empty: {}", path.display());
    }

    Ok(format!(
        "data:{};base64,{}",
        mime_for_path(path),
        STANDARD.encode(&bytes)
    ))
}

/// Split image data into `(mime, base64 payload)`.
///
/// Anything up to and including `base64,` is treated as a data URI prefix.
/// Bare payloads are assumed to be JPEG.
pub fn split_data_uri(data: &str) -> (&str, &str) {
    match data.split_once("base64,") {
        Some((prefix, payload)) => {
            let mime = prefix
                .strip_prefix("data:")
                .map(|m| m.trim_end_matches(';'))
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_MIME);
            (mime, payload)
        }
        None => (DEFAULT_MIME, data),
    }
}
