//! Data models for plant identification.
//!
//! This module contains the analysis record produced from a model response
//! and the history entry persisted after each identification.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Common name used when the response doesn't provide one.
pub const DEFAULT_COMMON_NAME: &str = "Unknown Plant";

/// Scientific name used when the response doesn't provide one.
pub const DEFAULT_SCIENTIFIC_NAME: &str = "Species unknown";

/// Placeholder characteristic used when none could be parsed.
pub const DEFAULT_CHARACTERISTIC: &str = "Plant characteristics could not be determined";

/// Coarse confidence reported by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Map free-form wording to a level.
    ///
    /// Substring match on the lower-cased text: "high" wins over "low",
    /// anything unrecognized is medium.
    pub fn from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("high") {
            ConfidenceLevel::High
        } else if text.contains("low") {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Medium
        }
    }

    /// Numeric score in [0, 1].
    pub fn score(&self) -> f64 {
        match self {
            ConfidenceLevel::Low => 0.5,
            ConfidenceLevel::Medium => 0.7,
            ConfidenceLevel::High => 0.9,
        }
    }
}

/// Structured result of identifying a plant from an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantAnalysis {
    /// Common name of the plant.
    pub common_name: String,
    /// Binomial (scientific) name.
    pub scientific_name: String,
    /// Confidence score in [0, 1].
    pub confidence: f64,
    /// Notable characteristics, in the order the model listed them.
    pub characteristics: Vec<String>,
}

impl Default for PlantAnalysis {
    fn default() -> Self {
        Self {
            common_name: DEFAULT_COMMON_NAME.to_string(),
            scientific_name: DEFAULT_SCIENTIFIC_NAME.to_string(),
            confidence: ConfidenceLevel::default().score(),
            characteristics: vec![DEFAULT_CHARACTERISTIC.to_string()],
        }
    }
}

impl PlantAnalysis {
    /// Confidence rounded to an integer percentage.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// A persisted identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Caller-supplied identifier, expected unique.
    pub id: String,
    /// Capture time in epoch milliseconds.
    pub timestamp: i64,
    /// Data URI or path of the identified image.
    pub image_url: String,
    /// The analysis shown for this image.
    pub analysis: PlantAnalysis,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    ///
    /// The id is the timestamp in milliseconds, as a decimal string.
    pub fn now(image_url: String, analysis: PlantAnalysis) -> Self {
        let timestamp = Utc::now().timestamp_millis();
        Self {
            id: timestamp.to_string(),
            timestamp,
            image_url,
            analysis,
        }
    }

    /// Capture time in the local timezone, if the timestamp is in range.
    pub fn local_time(&self) -> Option<DateTime<Local>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp).map(|t| t.with_timezone(&Local))
    }

    /// Capture date formatted for display.
    pub fn display_date(&self) -> String {
        self.local_time()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown date".to_string())
    }
}
