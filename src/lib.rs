pub mod config;
pub mod error;
pub mod importer;
pub mod models;
pub mod upload;

pub use error::{AppError, Result};
pub use importer::{AttendanceCsvImporter, ImportError, ImportResult, ImportSummary};
