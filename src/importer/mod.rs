//! Attendance CSV importer.
//!
//! Parses attendance CSV text, validates each row, and returns the accepted
//! records together with a per-row error report. The importer does no I/O and
//! keeps no state between calls; callers hand the result to whatever persists
//! records and writes the upload log.
//!
//! # Example
//!
//! ```
//! use std::collections::HashSet;
//! use attendance_import::importer::AttendanceCsvImporter;
//!
//! let csv = "EP NO,Name,Date,Status,In,Out\nE1,Jane,2023-10-01,Present,09:00,17:00";
//! let result = AttendanceCsvImporter::default().import(csv, &HashSet::new())?;
//! assert_eq!(result.summary.success, 1);
//! # Ok::<(), attendance_import::importer::ImportError>(())
//! ```

mod error;
mod keys;
mod parser;
mod validate;

#[cfg(test)]
mod tests;

pub use error::{ImportError, Result, RowError, RowErrorKind};
pub use keys::parse_existing_keys;
pub use parser::{COLUMN_ALIASES, OPTIONAL_COLUMNS, REQUIRED_COLUMNS, canonical_column, detect_delimiter};
pub use validate::{parse_date, parse_time};

use crate::config::{ConfigError, ImportConfig};
use crate::models::{AttendanceKey, AttendanceRecord};
use csv::{ReaderBuilder, StringRecord};
use parser::{ColumnMap, LineCounter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Counters shown in the upload log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Non-empty data rows seen.
    pub total: usize,
    /// Accepted rows with a new key.
    pub success: usize,
    /// Accepted rows whose key already existed.
    pub updated: usize,
    pub errors: usize,
}

/// Outcome of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Accepted records in input order.
    pub records: Vec<AttendanceRecord>,
    /// Rejected rows in input order.
    pub errors: Vec<RowError>,
    pub summary: ImportSummary,
}

impl ImportResult {
    /// True when every row was accepted.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// One line per rejected row.
    pub fn error_report(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Validating importer for attendance CSV files.
#[derive(Debug, Clone, Default)]
pub struct AttendanceCsvImporter {
    config: ImportConfig,
}

impl AttendanceCsvImporter {
    /// Create an importer with the given settings.
    ///
    /// Fails when the settings would not tokenize, e.g. a non-ASCII delimiter.
    pub fn new(config: ImportConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Import attendance rows from CSV text.
    ///
    /// `existing_keys` holds the `(EP NO, Date)` pairs already stored; rows
    /// matching one are accepted and counted as updates. Only an empty input
    /// or a header missing required columns fails the call; bad rows are
    /// reported in [`ImportResult::errors`].
    pub fn import(&self, csv_text: &str, existing_keys: &HashSet<AttendanceKey>) -> Result<ImportResult> {
        let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);
        let (line_offset, body) = parser::skip_blank_lines(text);
        if body.is_empty() {
            return Err(ImportError::EmptyInput);
        }

        let delimiter = if self.config.detect_delimiter {
            detect_delimiter(body)
        } else {
            self.config.delimiter
        };
        debug!("Importing attendance CSV with delimiter {delimiter:?}");

        // ASCII-only, checked in `new`.
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .flexible(true)
            .from_reader(body.as_bytes());

        let headers = reader.headers()?.clone();
        let columns = ColumnMap::bind(&headers, &self.config.column_aliases)?;

        let mut result = ImportResult::default();
        let mut seen_in_file: HashSet<AttendanceKey> = HashSet::new();
        let mut record = StringRecord::new();
        let mut row = 0;
        let mut lines = LineCounter::new(body, line_offset + 1);

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) if parser::is_blank(&record) => continue,
                Ok(true) => {
                    row += 1;
                    let line = lines.line_at(record.position().map_or(0, |p| p.byte()));
                    if record.len() != columns.width() {
                        let error = RowError::new(
                            row,
                            line,
                            None,
                            RowErrorKind::MalformedRow,
                            format!("Expected {} fields, found {}", columns.width(), record.len()),
                        );
                        debug!("Rejected {error}");
                        result.errors.push(error);
                        continue;
                    }

                    let raw = columns.row(&record, row, line, self.config.trim_fields);
                    match validate::validate_row(&raw) {
                        Ok(accepted) => {
                            let key = accepted.key();
                            let is_update = existing_keys.contains(&key)
                                || (self.config.flag_in_file_duplicates && !seen_in_file.insert(key));
                            if is_update {
                                result.summary.updated += 1;
                            } else {
                                result.summary.success += 1;
                            }
                            result.records.push(accepted);
                        }
                        Err(error) => {
                            debug!("Rejected {error}");
                            result.errors.push(error);
                        }
                    }
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    row += 1;
                    let line = lines.line_at(e.position().map_or(0, |p| p.byte()));
                    let error = RowError::new(row, line, None, RowErrorKind::MalformedRow, e.to_string());
                    debug!("Rejected {error}");
                    result.errors.push(error);
                }
            }
        }

        if row == 0 {
            return Err(ImportError::EmptyInput);
        }

        result.summary.total = row;
        result.summary.errors = result.errors.len();

        info!(
            "Attendance import finished: total {}, success {}, updated {}, errors {}",
            result.summary.total, result.summary.success, result.summary.updated, result.summary.errors
        );

        Ok(result)
    }
}

/// Import with default settings.
pub fn import_attendance_csv(csv_text: &str, existing_keys: &HashSet<AttendanceKey>) -> Result<ImportResult> {
    AttendanceCsvImporter::default().import(csv_text, existing_keys)
}
