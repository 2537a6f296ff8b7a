//! CSV import for vital-sign tables
//!
//! Cells become [`RawValue`]s by type inference; rows whose width does not
//! match the header are skipped and reported instead of failing the load.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::normalize::{RawRow, RawValue};

/// A row that could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based line in the source file
    pub line: u64,
    pub message: String,
}

/// Parsed contents of one CSV source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub errors: Vec<RowError>,
}

fn record_to_row(headers: &[String], record: &StringRecord) -> RawRow {
    headers
        .iter()
        .zip(record.iter())
        .map(|(header, cell)| (header.clone(), RawValue::infer(cell)))
        .collect()
}

/// Parse CSV data with a header row
pub fn parse_table<R: Read>(reader: R) -> Result<ParsedTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::InvalidData("missing header row".into()));
    }

    let mut table = ParsedTable {
        headers,
        ..Default::default()
    };

    for (index, result) in rdr.records().enumerate() {
        // Header is line 1
        let fallback_line = index as u64 + 2;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                if record.len() != table.headers.len() {
                    table.errors.push(RowError {
                        line,
                        message: format!(
                            "expected {} fields, found {}",
                            table.headers.len(),
                            record.len()
                        ),
                    });
                    continue;
                }
                table.rows.push(record_to_row(&table.headers, &record));
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                table.errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    if !table.errors.is_empty() {
        warn!(skipped = table.errors.len(), "Skipped malformed CSV rows");
    }
    debug!(
        "Parsed {} rows ({} columns)",
        table.rows.len(),
        table.headers.len()
    );
    Ok(table)
}

/// Read and parse a CSV file from disk
pub fn load_table(path: &Path) -> Result<ParsedTable> {
    let file = File::open(path)?;
    let table = parse_table(file)?;
    debug!(path = %path.display(), rows = table.rows.len(), "Loaded CSV source");
    Ok(table)
}
