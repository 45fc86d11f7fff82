//! Markdown and JSON rendering.
//!
//! This module renders identification results and the stored history for
//! the terminal or an output file.

use crate::models::{HistoryEntry, PlantAnalysis};
use anyhow::{Context, Result};
use serde::Serialize;

/// Render a single identification.
pub fn render_analysis_markdown(analysis: &PlantAnalysis, image: Option<&str>) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", analysis.common_name));
    output.push_str(&format!(
        "- **Scientific Name:** _{}_\n",
        analysis.scientific_name
    ));
    output.push_str(&format!(
        "- **Confidence:** {}%\n",
        analysis.confidence_percent()
    ));
    if let Some(image) = image {
        output.push_str(&format!("- **Image:** {}\n", describe_image(image)));
    }
    output.push('\n');

    output.push_str("## Characteristics\n\n");
    output.push_str(&generate_characteristics_list(&analysis.characteristics));

    output
}

/// Render the stored history, newest first.
pub fn render_history_markdown(entries: &[HistoryEntry]) -> String {
    let mut output = String::new();

    output.push_str("# Recent Identifications\n\n");

    if entries.is_empty() {
        output.push_str("No identifications yet.\n");
        return output;
    }

    for entry in entries {
        let analysis = &entry.analysis;
        output.push_str(&format!(
            "## {} ({})\n\n",
            analysis.common_name,
            entry.display_date()
        ));
        output.push_str(&format!(
            "- **Scientific Name:** _{}_\n",
            analysis.scientific_name
        ));
        output.push_str(&format!(
            "- **Confidence:** {}%\n",
            analysis.confidence_percent()
        ));
        output.push_str(&format!("- **Image:** {}\n", describe_image(&entry.image_url)));
        output.push_str("- **Characteristics:**\n");
        for characteristic in &analysis.characteristics {
            output.push_str(&format!("  - {}\n", characteristic));
        }
        output.push('\n');
    }

    output
}

/// Pretty JSON in the same layout as the history slot.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize JSON output")
}

fn generate_characteristics_list(characteristics: &[String]) -> String {
    let mut list = String::new();
    for characteristic in characteristics {
        list.push_str(&format!("- {}\n", characteristic));
    }
    list
}

/// Data URIs are far too long to print; summarize them.
fn describe_image(image: &str) -> String {
    match image.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or("image");
            format!("embedded {} ({} bytes)", mime, image.len())
        }
        None => format!("`{}`", image),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rose() -> PlantAnalysis {
        PlantAnalysis {
            common_name: "Rose".to_string(),
            scientific_name: "Rosa".to_string(),
            confidence: 0.9,
            characteristics: vec!["red".to_string(), "thorny".to_string()],
        }
    }

    #[test]
    fn test_render_analysis() {
        let md = render_analysis_markdown(&rose(), Some("photos/rose.jpg"));

        assert!(md.starts_with("# Rose\n"));
        assert!(md.contains("_Rosa_"));
        assert!(md.contains("**Confidence:** 90%"));
        assert!(md.contains("`photos/rose.jpg`"));
        assert!(md.contains("- red\n- thorny\n"));
    }

    #[test]
    fn test_render_analysis_summarizes_data_uri() {
        let md = render_analysis_markdown(&rose(), Some("data:image/png;base64,AAAA"));
        assert!(md.contains("embedded image/png"));
        assert!(!md.contains("AAAA"));
    }

    #[test]
    fn test_render_empty_history() {
        let md = render_history_markdown(&[]);
        assert!(md.contains("No identifications yet."));
    }

    #[test]
    fn test_render_history() {
        let entries = vec![
            HistoryEntry {
                id: "2".to_string(),
                timestamp: 1_700_000_100_000,
                image_url: "b.jpg".to_string(),
                analysis: rose(),
            },
            HistoryEntry {
                id: "1".to_string(),
                timestamp: 1_700_000_000_000,
                image_url: "a.jpg".to_string(),
                analysis: PlantAnalysis::default(),
            },
        ];

        let md = render_history_markdown(&entries);
        let rose_at = md.find("## Rose").unwrap();
        let unknown_at = md.find("## Unknown Plant").unwrap();
        assert!(rose_at < unknown_at);
        assert!(md.contains("**Confidence:** 70%"));
        assert!(md.contains("  - thorny\n"));
    }

    #[test]
    fn test_render_json_uses_camel_case() {
        let json = render_json(&rose()).unwrap();
        assert!(json.contains("\"commonName\": \"Rose\""));
        assert!(json.contains("\"scientificName\": \"Rosa\""));
    }
}
