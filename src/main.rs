//! PlantId - identify plants from photos
//!
//! A CLI tool that sends a plant photo to the Gemini vision API,
//! prints the identification, and keeps a short local history.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing API key, request failure, bad config, etc.)

mod analysis;
mod cli;
mod config;
mod history;
mod models;
mod report;
mod storage;
mod vision;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use history::HistoryStore;
use indicatif::{ProgressBar, ProgressStyle};
use models::HistoryEntry;
use std::path::Path;
use std::time::Duration;
use storage::FileStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use vision::{load_image_data_uri, VisionClient};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("PlantId v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", redact(&args));

    let result = if args.history {
        show_history(&args, &config)
    } else {
        run_identification(&args, &config).await
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .plantid.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    Ok(())
}

/// Initialize logging on stderr so stdout stays clean for results.
fn init_logging(args: &Args, config: &Config) {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging was already initialized");
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("Warning: ignoring {}: {:#}", CONFIG_FILE, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}

fn open_history(config: &Config) -> HistoryStore<FileStore> {
    let dir = config.history.resolved_dir();
    debug!("History directory: {}", dir.display());

    let store = FileStore::new(dir).with_quota(config.history.max_slot_bytes);
    HistoryStore::new(store)
}

/// Print the stored history.
fn show_history(args: &Args, config: &Config) -> Result<()> {
    let entries = open_history(config).list();
    info!("Loaded {} history entries", entries.len());

    let output = match args.format {
        OutputFormat::Json => report::render_json(&entries)?,
        OutputFormat::Markdown => report::render_history_markdown(&entries),
    };

    emit(config, &output)
}

/// Identify the image given on the command line.
async fn run_identification(args: &Args, config: &Config) -> Result<()> {
    let image_path = args
        .image
        .as_deref()
        .context("An image is required (--image FILE)")?;

    let image_data = load_image_data_uri(image_path)?;
    info!(
        "Loaded image {} ({} bytes encoded)",
        image_path.display(),
        image_data.len()
    );

    if args.dry_run {
        println!("\n🔍 Dry run: no API call made.");
        println!("   Image: {}", image_path.display());
        println!("   Encoded size: {} bytes", image_data.len());
        println!("   Model: {}", config.model.name);
        println!("   Endpoint: {}", config.model.api_url);
        return Ok(());
    }

    let client = VisionClient::new(config.vision_config(args.api_key.clone()))
        .context("Failed to create HTTP client")?;

    let spinner = analysis_spinner(args.quiet);
    let result = client.identify(&image_data).await;
    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }

    let analysis = result.context("Failed to analyze plant image")?;
    info!(
        "Identified {} ({}, {}%)",
        analysis.common_name,
        analysis.scientific_name,
        analysis.confidence_percent()
    );

    let image_ref = image_path.display().to_string();
    let output = match args.format {
        OutputFormat::Json => report::render_json(&analysis)?,
        OutputFormat::Markdown => {
            report::render_analysis_markdown(&analysis, Some(image_ref.as_str()))
        }
    };
    emit(config, &output)?;

    if args.no_save {
        debug!("Skipping history (--no-save)");
        return Ok(());
    }

    let image_url = if config.history.embed_images {
        image_data
    } else {
        image_ref
    };

    // History is a convenience; a failed write never fails the identification.
    if let Err(e) = open_history(config).append(HistoryEntry::now(image_url, analysis)) {
        warn!("Could not save to history: {}", e);
    }

    Ok(())
}

fn analysis_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Analyzing your plant...");
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

/// Write to the configured output file, or stdout.
fn emit(config: &Config, output: &str) -> Result<()> {
    if config.general.output.is_empty() {
        println!("{}", output);
        return Ok(());
    }

    let path = Path::new(&config.general.output);
    std::fs::write(path, output)
        .with_context(|| format!("Failed to write output to {}", path.display()))?;
    println!("✅ Saved to {}", path.display());
    Ok(())
}

/// Arguments with the API key masked, for debug logging.
fn redact(args: &Args) -> Args {
    let mut args = args.clone();
    if args.api_key.is_some() {
        args.api_key = Some("***".to_string());
    }
    args
}
