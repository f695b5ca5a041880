//! File upload pipeline: read a CSV file, import it, and build its upload log.

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::importer::{AttendanceCsvImporter, ImportResult, parse_existing_keys};
use crate::models::{AttendanceKey, UploadLog};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Who uploaded a file, for which company, and when.
#[derive(Debug, Clone)]
pub struct UploadContext {
    pub uploaded_by: String,
    pub company: String,
    pub date: NaiveDate,
}

impl UploadContext {
    /// Context filled from config defaults.
    pub fn from_config(config: &AppConfig, date: NaiveDate) -> Self {
        Self {
            uploaded_by: config.upload.uploaded_by.clone(),
            company: config.upload.company.clone(),
            date,
        }
    }
}

/// Import result plus the log entry describing it.
#[derive(Debug, Clone, Serialize)]
pub struct Upload {
    pub log: UploadLog,
    pub result: ImportResult,
}

impl Upload {
    /// Serialize for machine-readable output.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read and import one attendance CSV file.
pub fn upload_file(
    path: &Path,
    existing_keys: &HashSet<AttendanceKey>,
    config: &AppConfig,
    context: &UploadContext,
) -> Result<Upload> {
    let text = read_csv_file(path, config.upload.max_file_mb)?;
    let result = AttendanceCsvImporter::new(config.import.clone())?.import(&text, existing_keys)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let log = UploadLog::new(
        file_name,
        context.uploaded_by.clone(),
        context.company.clone(),
        context.date,
        &result.summary,
    );
    info!("Uploaded {}: {}", log.file_name, log.summary());

    Ok(Upload { log, result })
}

/// Read an existing-keys CSV (`EP NO`, `Date`).
pub fn load_existing_keys(path: &Path) -> Result<HashSet<AttendanceKey>> {
    let text = std::fs::read_to_string(path)?;
    let keys = parse_existing_keys(&text)?;
    info!("Loaded {} existing keys from {:?}", keys.len(), path);
    Ok(keys)
}

fn read_csv_file(path: &Path, max_file_mb: u64) -> Result<String> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(AppError::input(format!("{} is not a .csv file", path.display())));
    }

    let size = std::fs::metadata(path)?.len();
    if size > max_file_mb.saturating_mul(1024 * 1024) {
        return Err(AppError::input(format!(
            "{} is {size} bytes, larger than the {max_file_mb} MB limit",
            path.display()
        )));
    }

    Ok(std::fs::read_to_string(path)?)
}
