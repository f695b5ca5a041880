//! Configuration management module.

use crate::importer::canonical_column;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub import: ImportConfig,
    pub log: LogConfig,
    pub upload: UploadConfig,
}

/// CSV import settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Field delimiter (default: ',').
    pub delimiter: char,
    /// Pick the delimiter from the header line instead of `delimiter`.
    pub detect_delimiter: bool,
    /// Strip surrounding whitespace from every field.
    pub trim_fields: bool,
    /// Count a repeated `(EP NO, Date)` within one file as an update.
    pub flag_in_file_duplicates: bool,
    /// Extra header spellings, alias → column name. Checked before the
    /// built-in aliases.
    pub column_aliases: BTreeMap<String, String>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of trace, debug, info, warn, error.
    pub level: String,
}

/// Defaults for upload log entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub uploaded_by: String,
    pub company: String,
    /// Largest accepted upload in megabytes (default: 10).
    pub max_file_mb: u64,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Get config file path in the platform config directory.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "attendance-import")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.import.validate()?;
        if self.upload.max_file_mb < 1 {
            return Err(ConfigError::Validation(
                "Max file size must be at least 1 MB".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "Log level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log.level
            )));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ImportConfig {
    /// Validate import settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::Validation("Delimiter must be an ASCII character".to_string()));
        }
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(ConfigError::Validation(
                "Delimiter cannot be a quote or line break".to_string(),
            ));
        }
        for (alias, column) in &self.column_aliases {
            if alias.trim().is_empty() {
                return Err(ConfigError::Validation("Column alias cannot be empty".to_string()));
            }
            if canonical_column(column).is_none() {
                return Err(ConfigError::Validation(format!(
                    "Alias '{alias}' maps to unknown column '{column}'"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            detect_delimiter: false,
            trim_fields: true,
            flag_in_file_duplicates: false,
            column_aliases: BTreeMap::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            uploaded_by: "admin".to_string(),
            company: String::new(),
            max_file_mb: 10,
        }
    }
}
