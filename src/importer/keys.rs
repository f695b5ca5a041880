//! Existing-key lists supplied by the persistence side.

use super::error::{ImportError, Result};
use super::parser::{self, DATE, EP_NO};
use super::validate::parse_date;
use crate::models::AttendanceKey;
use csv::ReaderBuilder;
use std::collections::HashSet;
use tracing::warn;

/// Parse a CSV with `EP NO` and `Date` columns into a key set.
///
/// Rows with an empty id or an unparseable date are skipped with a warning.
pub fn parse_existing_keys(csv_text: &str) -> Result<HashSet<AttendanceKey>> {
    let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);
    let (_, body) = parser::skip_blank_lines(text);
    if body.is_empty() {
        return Ok(HashSet::new());
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(parser::detect_delimiter(body) as u8)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| parser::clean_header(h).eq_ignore_ascii_case(name))
    };
    let (ep_idx, date_idx) = match (position(EP_NO), position(DATE)) {
        (Some(ep), Some(date)) => (ep, date),
        (ep, date) => {
            let missing = [(EP_NO, ep), (DATE, date)]
                .iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(ImportError::MissingRequiredColumn(missing));
        }
    };

    let mut keys = HashSet::new();
    for result in reader.records() {
        let record = result?;
        if parser::is_blank(&record) {
            continue;
        }
        let employee_id = record.get(ep_idx).unwrap_or("").trim();
        let raw_date = record.get(date_idx).unwrap_or("").trim();
        match parse_date(raw_date) {
            Some(date) if !employee_id.is_empty() => {
                keys.insert(AttendanceKey::new(employee_id, date));
            }
            _ => warn!("Skipping existing key '{employee_id}' / '{raw_date}'"),
        }
    }

    Ok(keys)
}
