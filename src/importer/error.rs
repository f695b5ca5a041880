//! Import error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that abort a whole import before any row is reported.
#[derive(Error, Debug)]
pub enum ImportError {
    /// No header, or a header without data rows.
    #[error("Input is empty or contains only a header")]
    EmptyInput,

    /// Header lacks one or more required columns.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingRequiredColumn(Vec<String>),

    /// Header could not be tokenized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Why a single row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowErrorKind {
    MalformedRow,
    RequiredFieldMissing,
    InvalidDate,
    InvalidStatus,
    InvalidTime,
    TimeOrderInvalid,
}

/// A rejected row. Rows are numbered from 1, header excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    /// Line in the source text where the record starts.
    pub line: u64,
    /// Offending column, absent for malformed rows.
    pub column: Option<String>,
    pub kind: RowErrorKind,
    pub message: String,
}

impl RowError {
    pub(crate) fn new(
        row: usize,
        line: u64,
        column: Option<&str>,
        kind: RowErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row,
            line,
            column: column.map(str::to_string),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "Row {} (line {}) [{}]: {}", self.row, self.line, column, self.message),
            None => write!(f, "Row {} (line {}): {}", self.row, self.line, self.message),
        }
    }
}
