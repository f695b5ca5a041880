//! CSV tokenizing and header binding.

use super::error::{ImportError, Result};
use csv::StringRecord;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const EP_NO: &str = "EP NO";
pub const NAME: &str = "Name";
pub const DATE: &str = "Date";
pub const STATUS: &str = "Status";
pub const IN: &str = "In";
pub const OUT: &str = "Out";
pub const COMPANY: &str = "Company";
pub const SHIFT: &str = "Shift";
pub const OVERSTAY: &str = "Overstay";

/// Columns every attendance file must declare.
pub const REQUIRED_COLUMNS: [&str; 6] = [EP_NO, NAME, DATE, STATUS, IN, OUT];

/// Columns that are read when present.
pub const OPTIONAL_COLUMNS: [&str; 3] = [COMPANY, SHIFT, OVERSTAY];

/// Header spellings used by device exports, mapped to the columns they feed.
pub const COLUMN_ALIASES: [(&str, &str); 6] = [
    ("EP NAME", NAME),
    ("PUNCHDATE", DATE),
    ("PUNCH1 IN", IN),
    ("PUNCH2 OUT", OUT),
    ("COMPANY NAME", COMPANY),
    ("CONTRACTOR NAME", COMPANY),
];

/// Canonical spelling of a known column, ignoring ASCII case and extra
/// whitespace.
pub fn canonical_column(name: &str) -> Option<&'static str> {
    let name = clean_header(name);
    REQUIRED_COLUMNS
        .iter()
        .chain(OPTIONAL_COLUMNS.iter())
        .copied()
        .find(|known| known.eq_ignore_ascii_case(&name))
}

/// Detect the delimiter used in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let delimiters = [',', '\t', ';', '|'];
    let mut counts: Vec<(char, usize)> = delimiters
        .iter()
        .map(|&d| (d, first_line.matches(d).count()))
        .collect();

    // Stable sort keeps ',' first on ties.
    counts.sort_by_key(|&(_, count)| std::cmp::Reverse(count));

    counts.first().map(|&(d, _)| d).unwrap_or(',')
}

/// Trim a header cell and collapse internal whitespace.
pub fn clean_header(field: &str) -> String {
    field.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop leading whitespace-only lines. Returns the number of lines skipped
/// and the remaining text, which starts at the header line.
pub(crate) fn skip_blank_lines(text: &str) -> (u64, &str) {
    let mut skipped = 0;
    let mut rest = text;
    while let Some(end) = rest.find('\n') {
        if !rest[..end].trim().is_empty() {
            break;
        }
        rest = &rest[end + 1..];
        skipped += 1;
    }
    if rest.trim().is_empty() { (skipped, "") } else { (skipped, rest) }
}

/// Known columns bound to their positions in the header.
#[derive(Debug)]
pub(crate) struct ColumnMap {
    /// `(header index, canonical name)` in header order.
    bound: Vec<(usize, &'static str)>,
    width: usize,
}

impl ColumnMap {
    /// Bind header cells to known column names, case-insensitively.
    ///
    /// `extra_aliases` (alias → column) are checked first, then the built-in
    /// aliases, then the column names themselves. A repeated column binds to
    /// its first occurrence; unknown columns are ignored.
    pub(crate) fn bind(headers: &StringRecord, extra_aliases: &BTreeMap<String, String>) -> Result<Self> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportError::EmptyInput);
        }

        let mut bound: Vec<(usize, &'static str)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let cleaned = clean_header(header);
            let known = resolve_header(&cleaned, extra_aliases);

            match known {
                Some(name) if bound.iter().any(|&(_, n)| n == name) => {
                    warn!("Duplicate column '{cleaned}' at position {}, using first occurrence", idx + 1);
                }
                Some(name) => bound.push((idx, name)),
                None => debug!("Ignoring unknown column '{cleaned}'"),
            }
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !bound.iter().any(|(_, n)| n == *name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingRequiredColumn(missing));
        }

        Ok(Self {
            bound,
            width: headers.len(),
        })
    }

    /// Number of fields every data record must have.
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    /// Bind a data record. The caller has already checked its width.
    pub(crate) fn row<'r>(&self, record: &'r StringRecord, row: usize, line: u64, trim: bool) -> RawRow<'r> {
        let values = self
            .bound
            .iter()
            .map(|&(idx, name)| {
                let value = record.get(idx).unwrap_or("");
                (name, if trim { value.trim() } else { value })
            })
            .collect();
        RawRow { row, line, values }
    }
}

fn resolve_header(cleaned: &str, extra_aliases: &BTreeMap<String, String>) -> Option<&'static str> {
    let configured = extra_aliases
        .iter()
        .find(|(alias, _)| clean_header(alias).eq_ignore_ascii_case(cleaned))
        .and_then(|(alias, target)| {
            let column = canonical_column(target);
            if column.is_none() {
                warn!("Alias '{alias}' points at unknown column '{target}'");
            }
            column
        });

    configured
        .or_else(|| {
            COLUMN_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(cleaned))
                .map(|&(_, column)| column)
        })
        .or_else(|| canonical_column(cleaned))
}

/// Maps record start offsets to 1-based source line numbers.
///
/// The csv reader's own line counter is off for CRLF input and skipped empty
/// lines, so lines are counted from byte offsets instead. Offsets must be
/// non-decreasing for the count to stay linear.
pub(crate) struct LineCounter<'t> {
    text: &'t [u8],
    pos: usize,
    line: u64,
}

impl<'t> LineCounter<'t> {
    /// `first_line` is the source line on which `text` begins.
    pub(crate) fn new(text: &'t str, first_line: u64) -> Self {
        Self {
            text: text.as_bytes(),
            pos: 0,
            line: first_line,
        }
    }

    /// Line of the record whose position is `byte`.
    ///
    /// The position may sit on the terminators left over from the previous
    /// record or on skipped empty lines; those are stepped over first.
    pub(crate) fn line_at(&mut self, byte: u64) -> u64 {
        let len = self.text.len();
        let mut start = usize::try_from(byte).unwrap_or(len).min(len);
        while start < len && matches!(self.text[start], b'\r' | b'\n') {
            start += 1;
        }

        if start < self.pos {
            // Out-of-order position: recount from the beginning.
            let first_line = self.line - count_newlines(&self.text[..self.pos]);
            self.pos = 0;
            self.line = first_line;
        }
        self.line += count_newlines(&self.text[self.pos..start]);
        self.pos = start;
        self.line
    }
}

fn count_newlines(bytes: &[u8]) -> u64 {
    bytes.iter().filter(|&&b| b == b'\n').count() as u64
}

/// One data record keyed by column name, before validation.
#[derive(Debug)]
pub(crate) struct RawRow<'r> {
    pub row: usize,
    pub line: u64,
    values: Vec<(&'static str, &'r str)>,
}

impl<'r> RawRow<'r> {
    /// Value of a column, empty when the column is not in the header.
    pub(crate) fn get(&self, column: &str) -> &'r str {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|&(_, value)| value)
            .unwrap_or("")
    }

    /// Bound columns in header order.
    pub(crate) fn columns(&self) -> impl Iterator<Item = (&'static str, &'r str)> + '_ {
        self.values.iter().copied()
    }
}

/// True for records produced by whitespace-only lines.
pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}
