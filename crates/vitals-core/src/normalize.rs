//! Record normalization
//!
//! Turns a raw tabular row (column name → scalar) plus its source tag into a
//! canonical [`Record`]. Nothing here fails: a missing or unparseable
//! timestamp is replaced by a deterministic synthetic one, and a missing or
//! non-numeric reading simply leaves the attribute absent.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Attribute, Record, Source};

/// Columns consulted for the timestamp, in priority order
pub const TIMESTAMP_COLUMNS: [&str; 3] = ["datetime", "date", "timestamp"];

/// How far back the synthetic historical window starts
pub const HISTORICAL_WINDOW_DAYS: i64 = 180;

/// Datetime formats tried for text timestamps (after RFC 3339)
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only formats, interpreted as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// A scalar cell after type inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Empty,
}

impl RawValue {
    /// Infer the scalar type of a CSV cell: numbers win, blanks are empty,
    /// everything else stays text.
    pub fn infer(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return RawValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(number) => RawValue::Number(number),
            Err(_) => RawValue::Text(trimmed.to_string()),
        }
    }

    /// Finite numeric value, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }
}

/// One raw row keyed by column header
pub type RawRow = BTreeMap<String, RawValue>;

/// Look up a column by exact name, then case-insensitively
fn column<'a>(row: &'a RawRow, name: &str) -> Option<&'a RawValue> {
    row.get(name).or_else(|| {
        row.iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Parse a timestamp cell. Text goes through the known formats; numbers are
/// Unix epoch seconds.
pub fn parse_timestamp(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Text(text) => parse_timestamp_str(text),
        RawValue::Number(seconds) => {
            if !seconds.is_finite() {
                return None;
            }
            let whole = seconds.floor();
            let nanos = ((seconds - whole) * 1_000_000_000.0) as u32;
            DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
        }
        RawValue::Empty => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Deterministic fallback: historical rows start 180 days before `now`,
/// predicted rows start at `now`, one hour apart.
pub fn synthetic_timestamp(source: Source, row_index: usize, now: NaiveDateTime) -> NaiveDateTime {
    let base = match source {
        Source::Historical => now - Duration::days(HISTORICAL_WINDOW_DAYS),
        Source::Predicted => now,
    };
    base + Duration::hours(row_index as i64)
}

/// Resolve the row's timestamp, or `None` if it has to be synthesized
fn resolve_timestamp(row: &RawRow) -> Option<NaiveDateTime> {
    let candidate = TIMESTAMP_COLUMNS
        .iter()
        .filter_map(|name| column(row, name))
        .find(|value| !value.is_empty())?;
    parse_timestamp(candidate)
}

/// Normalize one raw row into a record
pub fn normalize_row(
    row: &RawRow,
    source: Source,
    row_index: usize,
    now: NaiveDateTime,
) -> Record {
    let timestamp =
        resolve_timestamp(row).unwrap_or_else(|| synthetic_timestamp(source, row_index, now));

    let mut record = Record::new(timestamp, source);
    for attribute in Attribute::ALL {
        let value = column(row, attribute.column()).and_then(RawValue::as_number);
        record.values.set(attribute, value);
    }
    record
}

/// Normalize a batch of rows from a single source, preserving order
pub fn normalize_rows(rows: &[RawRow], source: Source, now: NaiveDateTime) -> Vec<Record> {
    let mut synthesized = 0usize;
    let records: Vec<Record> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            if resolve_timestamp(row).is_none() {
                synthesized += 1;
            }
            normalize_row(row, source, index, now)
        })
        .collect();

    debug!(
        source = source.as_str(),
        rows = records.len(),
        synthesized,
        "Normalized source rows"
    );
    records
}
