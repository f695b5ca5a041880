//! Upload log entries shown in the upload-logs view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::importer::ImportSummary;

/// One upload log entry, built from the counters of a single import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLog {
    pub file_name: String,
    pub uploaded_by: String,
    pub company: String,
    pub date: NaiveDate,
    pub total: usize,
    pub success: usize,
    pub updated: usize,
    pub errors: usize,
}

impl UploadLog {
    /// Create a log entry from an import summary.
    pub fn new(
        file_name: impl Into<String>,
        uploaded_by: impl Into<String>,
        company: impl Into<String>,
        date: NaiveDate,
        summary: &ImportSummary,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            uploaded_by: uploaded_by.into(),
            company: company.into(),
            date,
            total: summary.total,
            success: summary.success,
            updated: summary.updated,
            errors: summary.errors,
        }
    }

    /// Get summary message.
    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Success: {}, Updated: {}, Errors: {}",
            self.total, self.success, self.updated, self.errors
        )
    }

    /// True when no row was rejected.
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}
