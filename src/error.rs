//! Error types and handling.

use thiserror::Error;

use crate::config::ConfigError;
use crate::importer::ImportError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Whole-import failure (empty input, missing columns)
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Command-line input error
    #[error("Invalid input: {0}")]
    Input(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create an input error with message
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_message() {
        let err: AppError = ImportError::MissingRequiredColumn(vec!["Status".to_string(), "Out".to_string()]).into();
        assert_eq!(err.to_string(), "Import error: Missing required column(s): Status, Out");
    }

    #[test]
    fn test_input_error_message() {
        assert_eq!(AppError::input("no file").to_string(), "Invalid input: no file");
    }
}
