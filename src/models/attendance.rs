//! Attendance records and the values they are built from.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attendance status as written in the `Status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Holiday,
    #[serde(rename = "Half Day")]
    HalfDay,
}

impl AttendanceStatus {
    /// All statuses in the order they are listed to users.
    pub const ALL: [AttendanceStatus; 4] = [Self::Present, Self::Absent, Self::Holiday, Self::HalfDay];

    /// Match a column value exactly against the canonical spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Present" => Some(Self::Present),
            "Absent" => Some(Self::Absent),
            "Holiday" => Some(Self::Holiday),
            "Half Day" => Some(Self::HalfDay),
            _ => None,
        }
    }

    /// Canonical column spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Holiday => "Holiday",
            Self::HalfDay => "Half Day",
        }
    }

    /// Whether `In` and `Out` must be filled for this status.
    pub fn requires_times(self) -> bool {
        matches!(self, Self::Present | Self::HalfDay)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an attendance record in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttendanceKey {
    pub employee_id: String,
    pub date: NaiveDate,
}

impl AttendanceKey {
    pub fn new(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
        }
    }
}

/// Overstay duration from the optional `Overstay` column (`H:MM`).
///
/// Hours are not capped at 24; device exports report multi-day overstays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Overstay {
    pub minutes: u32,
}

impl Overstay {
    /// Parse `H:MM` with one to three hour digits.
    pub fn parse(value: &str) -> Option<Self> {
        let (hours, minutes) = value.split_once(':')?;
        if hours.is_empty() || hours.len() > 3 || minutes.len() != 2 {
            return None;
        }
        if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hours: u32 = hours.parse().ok()?;
        let minutes: u32 = minutes.parse().ok()?;
        if minutes > 59 {
            return None;
        }
        Some(Self {
            minutes: hours * 60 + minutes,
        })
    }

    /// Overstay as a chrono duration.
    pub fn as_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }
}

impl fmt::Display for Overstay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

/// A validated attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub in_time: Option<NaiveTime>,
    pub out_time: Option<NaiveTime>,
    pub company: Option<String>,
    pub shift: Option<String>,
    pub overstay: Option<Overstay>,
}

impl AttendanceRecord {
    /// Storage key of this record.
    pub fn key(&self) -> AttendanceKey {
        AttendanceKey::new(self.employee_id.clone(), self.date)
    }
}
