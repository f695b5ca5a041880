//! Row validation rules.
//!
//! Each row is reported with at most one error: the first failing rule wins.

use super::error::{RowError, RowErrorKind};
use super::parser::{COMPANY, DATE, EP_NO, IN, NAME, OUT, OVERSTAY, RawRow, SHIFT, STATUS};
use crate::models::{AttendanceRecord, AttendanceStatus, Overstay};
use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

/// Columns whose values must be non-empty on every row.
const NON_EMPTY_COLUMNS: [&str; 4] = [EP_NO, NAME, DATE, STATUS];

/// Validate a bound row into an attendance record.
pub(crate) fn validate_row(row: &RawRow<'_>) -> Result<AttendanceRecord, RowError> {
    let fail = |column: &str, kind: RowErrorKind, message: String| -> Result<AttendanceRecord, RowError> {
        Err(RowError::new(row.row, row.line, Some(column), kind, message))
    };

    // Header order decides which empty column is reported.
    if let Some((column, _)) = row
        .columns()
        .find(|(name, value)| NON_EMPTY_COLUMNS.contains(name) && value.is_empty())
    {
        return fail(column, RowErrorKind::RequiredFieldMissing, format!("{column} is required"));
    }

    let raw_date = row.get(DATE);
    let Some(date) = parse_date(raw_date) else {
        return fail(
            DATE,
            RowErrorKind::InvalidDate,
            format!("Invalid date '{raw_date}', expected a real YYYY-MM-DD date"),
        );
    };

    let raw_status = row.get(STATUS);
    let Some(status) = AttendanceStatus::parse(raw_status) else {
        return fail(
            STATUS,
            RowErrorKind::InvalidStatus,
            format!("Invalid status '{raw_status}', must be one of: Present, Absent, Holiday, Half Day"),
        );
    };

    let (in_time, out_time) = if status.requires_times() {
        let mut times = [None, None];
        for (slot, column) in times.iter_mut().zip([IN, OUT]) {
            let raw = row.get(column);
            if raw.is_empty() {
                return fail(column, RowErrorKind::InvalidTime, format!("{column} is required for status {status}"));
            }
            match parse_time(raw) {
                Some(time) => *slot = Some(time),
                None => {
                    return fail(
                        column,
                        RowErrorKind::InvalidTime,
                        format!("Invalid time '{raw}', expected HH:MM between 00:00 and 23:59"),
                    );
                }
            }
        }
        (times[0], times[1])
    } else {
        (None, None)
    };

    // Same-day shifts only: an overnight checkout is reported, not wrapped.
    match (in_time, out_time) {
        (Some(in_time), Some(out_time)) if out_time < in_time => {
            return fail(
                OUT,
                RowErrorKind::TimeOrderInvalid,
                format!(
                    "Out {} is earlier than In {}",
                    out_time.format("%H:%M"),
                    in_time.format("%H:%M")
                ),
            );
        }
        _ => {}
    }

    Ok(AttendanceRecord {
        employee_id: row.get(EP_NO).to_string(),
        name: row.get(NAME).to_string(),
        date,
        status,
        in_time,
        out_time,
        company: non_empty(row.get(COMPANY)),
        shift: non_empty(row.get(SHIFT)),
        overstay: parse_overstay(row),
    })
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = [&value[0..4], &value[5..7], &value[8..10]];
    if !digits.iter().all(|part| part.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let year: i32 = digits[0].parse().ok()?;
    let month: u32 = digits[1].parse().ok()?;
    let day: u32 = digits[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a strict 24-hour `HH:MM` time.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let (hours, minutes) = (&value[0..2], &value[3..5]);
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

fn parse_overstay(row: &RawRow<'_>) -> Option<Overstay> {
    let raw = row.get(OVERSTAY);
    if raw.is_empty() {
        return None;
    }
    let overstay = Overstay::parse(raw);
    if overstay.is_none() {
        warn!("Row {}: ignoring overstay '{raw}', expected H:MM", row.row);
    }
    overstay
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
