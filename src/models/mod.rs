//! Data models for attendance records and upload logs.

pub mod attendance;
pub mod upload_log;

pub use attendance::{AttendanceKey, AttendanceRecord, AttendanceStatus, Overstay};
pub use upload_log::UploadLog;
