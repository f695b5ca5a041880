//! Attendance Import - validate attendance CSV files before they are stored.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use attendance_import as app;
use chrono::Local;
use clap::Parser;

use app::config::{AppConfig, ConfigLoadResult};
use app::upload::{self, Upload, UploadContext};

/// Validate an attendance CSV file and report what an upload would do.
#[derive(Parser)]
#[command(name = "attendance-import", version)]
struct Cli {
    /// Attendance CSV file to import
    file: PathBuf,

    /// CSV of already stored keys (EP NO, Date)
    #[arg(long, value_name = "KEYS.csv")]
    existing: Option<PathBuf>,

    /// Config file path (default: platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Print the upload log and import result as JSON
    #[arg(long)]
    json: bool,

    /// Uploader name recorded in the upload log
    #[arg(long)]
    user: Option<String>,

    /// Company recorded in the upload log
    #[arg(long)]
    company: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = if cli.dev {
        PathBuf::from("config.toml")
    } else {
        cli.config.clone().unwrap_or_else(AppConfig::default_path)
    };

    let (config, config_note) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, None),
        ConfigLoadResult::Missing => (AppConfig::default(), None),
        ConfigLoadResult::Invalid(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_ascii_lowercase())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Config path: {:?}", config_path);
    if let Some(e) = config_note {
        tracing::warn!("Config invalid, using defaults: {}", e);
    }

    match run(&cli, &config) {
        Ok(upload) if upload.result.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<Upload> {
    let existing = match &cli.existing {
        Some(path) => upload::load_existing_keys(path)
            .with_context(|| format!("Failed to load existing keys from {}", path.display()))?,
        None => HashSet::new(),
    };

    let mut context = UploadContext::from_config(config, Local::now().date_naive());
    if let Some(user) = &cli.user {
        context.uploaded_by = user.clone();
    }
    if let Some(company) = &cli.company {
        context.company = company.clone();
    }

    let upload = upload::upload_file(&cli.file, &existing, config, &context)
        .with_context(|| format!("Failed to import {}", cli.file.display()))?;

    if cli.json {
        println!("{}", upload.to_json()?);
    } else {
        print_report(&upload);
    }

    Ok(upload)
}

fn print_report(upload: &Upload) {
    let log = &upload.log;
    println!("File:     {}", log.file_name);
    println!("Uploader: {}", log.uploaded_by);
    if !log.company.is_empty() {
        println!("Company:  {}", log.company);
    }
    println!("Date:     {}", log.date);
    println!("{}", log.summary());

    if !upload.result.is_clean() {
        println!();
        println!("{}", upload.result.error_report());
    }
}
