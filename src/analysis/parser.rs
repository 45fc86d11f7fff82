//! Plant response parsing.
//!
//! The vision model answers in free text. We ask for `Key: value` lines but
//! nothing enforces that, so parsing is a tolerant fold over lines into a
//! draft record. Fields the response doesn't supply fall back to defaults.

use crate::models::{
    ConfidenceLevel, PlantAnalysis, DEFAULT_CHARACTERISTIC, DEFAULT_COMMON_NAME,
    DEFAULT_SCIENTIFIC_NAME,
};
use tracing::debug;

/// Fields collected so far. `None` means "not seen yet".
#[derive(Debug, Default)]
struct Draft {
    common_name: Option<String>,
    scientific_name: Option<String>,
    confidence: Option<ConfidenceLevel>,
    characteristics: Option<Vec<String>>,
}

impl Draft {
    /// Apply one `key: value` pair. Later lines overwrite earlier ones.
    fn apply(mut self, key: &str, value: &str) -> Self {
        match key {
            "common name" => self.common_name = Some(value.to_string()),
            "scientific name" => self.scientific_name = Some(value.to_string()),
            "characteristics" => {
                let items = split_characteristics(value);
                self.characteristics = if items.is_empty() { None } else { Some(items) };
            }
            "confidence" => self.confidence = Some(ConfidenceLevel::from_text(value)),
            other => debug!("Ignoring unrecognized field: {}", other),
        }
        self
    }

    fn finish(self) -> PlantAnalysis {
        PlantAnalysis {
            common_name: self
                .common_name
                .unwrap_or_else(|| DEFAULT_COMMON_NAME.to_string()),
            scientific_name: self
                .scientific_name
                .unwrap_or_else(|| DEFAULT_SCIENTIFIC_NAME.to_string()),
            confidence: self.confidence.unwrap_or_default().score(),
            characteristics: self
                .characteristics
                .unwrap_or_else(|| vec![DEFAULT_CHARACTERISTIC.to_string()]),
        }
    }
}

/// Parse a model response into a [`PlantAnalysis`].
///
/// Never fails: any string, including the empty one, yields a fully
/// populated record.
pub fn parse_plant_response(text: &str) -> PlantAnalysis {
    text.lines()
        .filter_map(split_field)
        .fold(Draft::default(), |draft, (key, value)| {
            draft.apply(&key, value)
        })
        .finish()
}

/// Split a line on its first colon into a normalized key and trimmed value.
///
/// Returns `None` for blank lines, lines without a colon, and lines where
/// either side is empty.
fn split_field(line: &str) -> Option<(String, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key.to_lowercase(), value))
}

fn split_characteristics(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Completeness check run by the caller after parsing.
///
/// [`parse_plant_response`] always substitutes non-empty defaults, so this
/// can't fail for freshly parsed values. It still guards records that came
/// from elsewhere (e.g. deserialized from storage).
pub fn validate_analysis(analysis: &PlantAnalysis) -> Result<(), String> {
    if analysis.common_name.trim().is_empty() {
        return Err("missing common name".to_string());
    }
    if analysis.scientific_name.trim().is_empty() {
        return Err("missing scientific name".to_string());
    }
    Ok(())
}
