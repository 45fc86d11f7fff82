//! Gemini vision client.
//!
//! Sends one image plus an identification prompt to the `generateContent`
//! endpoint and turns the text answer into a [`PlantAnalysis`]. Everything
//! that can go wrong on the way (credentials, transport, empty answers) is
//! rejected here so the parser only ever sees real response text.

use crate::analysis::{parse_plant_response, validate_analysis};
use crate::models::PlantAnalysis;
use crate::vision::image::split_data_uri;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised before or around the model call.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("Invalid image data provided")]
    InvalidImage,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to Gemini API at {0}")]
    Connect(String),

    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to send request: {0}")]
    Transport(String),

    #[error("Failed to parse Gemini response: {0}")]
    Decode(String),

    #[error("No analysis results received from the API")]
    EmptyResponse,

    #[error("Incomplete analysis results received: {0}")]
    Incomplete(String),
}

/// Configuration for the vision client.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_url: String,
    pub model_name: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com".to_string(),
            model_name: "gemini-1.5-flash".to_string(),
            api_key: None,
            temperature: 0.4,
            timeout_seconds: 60,
        }
    }
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// `generateContent` response body. Only the fields we read.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for plant identification requests.
pub struct VisionClient {
    config: VisionConfig,
    http_client: reqwest::Client,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| VisionError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Identify the plant in `image_data` (a data URI or bare base64).
    pub async fn identify(&self, image_data: &str) -> Result<PlantAnalysis, VisionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(VisionError::MissingApiKey)?;

        let (mime_type, payload) = split_data_uri(image_data);
        if payload.trim().is_empty() {
            return Err(VisionError::InvalidImage);
        }

        info!(
            "Requesting identification from {} ({} bytes of {})",
            self.config.model_name,
            payload.len(),
            mime_type
        );

        let text = self.generate(api_key, mime_type, payload).await?;
        debug!("Model response:\n{}", text);

        ensure_complete(parse_plant_response(&text))
    }

    async fn generate(
        &self,
        api_key: &str,
        mime_type: &str,
        payload: &str,
    ) -> Result<String, VisionError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model_name
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(IDENTIFY_PROMPT.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: payload.to_string(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    VisionError::Connect(self.config.api_url.clone())
                } else {
                    VisionError::Transport(e.without_url().to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api { status, body });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Decode(e.without_url().to_string()))?;

        extract_text(&body).ok_or(VisionError::EmptyResponse)
    }
}

fn ensure_complete(analysis: PlantAnalysis) -> Result<PlantAnalysis, VisionError> {
    validate_analysis(&analysis).map_err(VisionError::Incomplete)?;
    Ok(analysis)
}

/// Concatenate the text parts of the first candidate that has any.
fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .find(|text| !text.trim().is_empty())
}

/// Prompt sent alongside the image.
const IDENTIFY_PROMPT: &str = r#"Analyze this plant image and provide the following information in a structured format:
Common name:
Scientific name:
Characteristics:
Confidence: (high/medium/low)

Please ensure all fields are filled with appropriate values. If you cannot identify the plant with certainty, indicate this in the confidence level."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> VisionClient {
        VisionClient::new(VisionConfig {
            // Nothing listens here; tests must fail before sending
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: api_key.map(String::from),
            ..VisionConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_api_key() {
        let err = tokio_test::block_on(client(None).identify("data:image/jpeg;base64,AAAA"))
            .unwrap_err();
        assert!(matches!(err, VisionError::MissingApiKey));
        assert_eq!(err.to_string(), "Gemini API key is not configured");
    }

    #[test]
    fn test_incomplete_analysis_message() {
        let analysis = PlantAnalysis {
            common_name: "  ".to_string(),
            ..PlantAnalysis::default()
        };

        let err = ensure_complete(analysis).unwrap_err();
        assert!(matches!(err, VisionError::Incomplete(_)));
        assert!(err
            .to_string()
            .starts_with("Incomplete analysis results received"));
    }

    #[test]
    fn test_parsed_analysis_is_complete() {
        let analysis = ensure_complete(parse_plant_response("")).unwrap();
        assert!(!analysis.common_name.is_empty());
    }

    #[test]
    fn test_blank_api_key() {
        let err = tokio_test::block_on(client(Some("  ")).identify("AAAA")).unwrap_err();
        assert!(matches!(err, VisionError::MissingApiKey));
    }

    #[test]
    fn test_empty_image_payload() {
        let err = tokio_test::block_on(client(Some("key")).identify("data:image/png;base64,"))
            .unwrap_err();
        assert!(matches!(err, VisionError::InvalidImage));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some("prompt".to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/png".to_string(),
                            data: "AAAA".to_string(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert!(json["contents"][0]["parts"][0].get("inlineData").is_none());
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Common name: Rose\n"},{"text":"Confidence: high"}],"role":"model"}}]}"#,
        )
        .unwrap();

        assert_eq!(
            extract_text(&body).as_deref(),
            Some("Common name: Rose\nConfidence: high")
        );
    }

    #[test]
    fn test_extract_text_blank_is_none() {
        let body: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  \n"}]}}]}"#)
                .unwrap();
        assert!(extract_text(&body).is_none());

        let body: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_text(&body).is_none());

        // Blocked prompts come back without content
        let body: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(extract_text(&body).is_none());
    }

    #[test]
    fn test_prompt_requests_parsed_fields() {
        for field in ["Common name:", "Scientific name:", "Characteristics:", "Confidence:"] {
            assert!(IDENTIFY_PROMPT.contains(field));
        }
    }
}
