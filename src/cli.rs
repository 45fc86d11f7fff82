//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// PlantId - identify plants from photos
///
/// Sends a photo to the Gemini vision API, prints the identification,
/// and keeps the ten most recent results.
///
/// Examples:
///   plantid --image fern.jpg
///   plantid --image fern.jpg --format json --output fern.json
///   plantid --image fern.jpg --dry-run
///   plantid --history
///   plantid --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Photo of the plant to identify
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present_any = ["history", "init_config"]
    )]
    pub image: Option<PathBuf>,

    /// Show recent identifications and exit
    #[arg(long, conflicts_with = "image")]
    pub history: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model to use
    ///
    /// Can also be set via PLANTID_MODEL env var or .plantid.toml config.
    #[arg(short, long, env = "PLANTID_MODEL")]
    pub model: Option<String>,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Temperature for the model (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Directory holding the history
    #[arg(long, value_name = "DIR")]
    pub history_dir: Option<PathBuf>,

    /// Don't record this identification in the history
    #[arg(long)]
    pub no_save: bool,

    /// Load and encode the image without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .plantid.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .plantid.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config || self.history {
            return Ok(());
        }

        match self.image {
            Some(ref path) if !path.is_file() => {
                return Err(format!("Image file does not exist: {}", path.display()));
            }
            None => return Err("An image is required (--image FILE)".to_string()),
            _ => {}
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
