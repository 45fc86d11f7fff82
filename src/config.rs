//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.plantid.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::vision::VisionConfig;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".plantid.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// History settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. Empty means stdout.
    #[serde(default)]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Vision model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Gemini model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Gemini API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout() -> u64 {
    60
}

/// History persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Directory holding the history slot. Empty means the platform data dir.
    #[serde(default)]
    pub dir: String,

    /// Store the image itself as a data URI (true) or just its path (false).
    #[serde(default = "default_true")]
    pub embed_images: bool,

    /// Largest slot size accepted, in bytes.
    #[serde(default = "default_max_slot_bytes")]
    pub max_slot_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            embed_images: true,
            max_slot_bytes: default_max_slot_bytes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_slot_bytes() -> usize {
    5 * 1024 * 1024 // same order as browser local storage
}

impl HistoryConfig {
    /// Resolve the history directory.
    pub fn resolved_dir(&self) -> PathBuf {
        if !self.dir.is_empty() {
            return PathBuf::from(&self.dir);
        }
        dirs::data_dir()
            .map(|d| d.join("plantid"))
            .unwrap_or_else(|| PathBuf::from(".plantid"))
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.model.api_url = api_url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        if let Some(ref dir) = args.history_dir {
            self.history.dir = dir.display().to_string();
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Build the vision client configuration.
    pub fn vision_config(&self, api_key: Option<String>) -> VisionConfig {
        VisionConfig {
            api_url: self.model.api_url.clone(),
            model_name: self.model.name.clone(),
            api_key,
            temperature: self.model.temperature,
            timeout_seconds: self.model.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gemini-1.5-flash");
        assert_eq!(config.model.timeout_seconds, 60);
        assert!(config.history.embed_images);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[model]
name = "gemini-1.5-pro"
temperature = 0.2

[history]
dir = "/tmp/plants"
embed_images = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.model.name, "gemini-1.5-pro");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.timeout_seconds, 60);
        assert_eq!(config.history.resolved_dir(), PathBuf::from("/tmp/plants"));
        assert!(!config.history.embed_images);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[history]"));

        assert!(!toml_str.contains("max_entries"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(reparsed.history.embed_images);
    }

    #[test]
    fn test_stale_history_cap_keys_are_ignored() {
        // Older config files carried a history cap; it no longer has any effect
        for cap in ["0", "25"] {
            let toml_content = format!("[history]\nmax_entries = {}\nslot = \"other\"\n", cap);
            let config: Config = toml::from_str(&toml_content).unwrap();
            assert!(config.history.embed_images);

            let reserialized = toml::to_string_pretty(&config).unwrap();
            assert!(!reserialized.contains("max_entries"));
            assert!(!reserialized.contains("other"));
        }
    }

    #[test]
    fn test_vision_config() {
        let config = Config::default();
        let vision = config.vision_config(Some("secret".to_string()));
        assert_eq!(vision.model_name, "gemini-1.5-flash");
        assert_eq!(vision.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[history]\nembed_images = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.history.embed_images);
        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }
}
