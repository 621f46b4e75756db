//! Bar loading from CSV.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. Timestamps may be
//! RFC 3339 (`2025-01-01T09:30:00Z`), `YYYY-MM-DD HH:MM:SS` (taken as UTC)
//! or a bare date (midnight UTC). Loaded bars go through the validation
//! gateway before they are returned.

use crate::gateway::{validate_bars, ValidationError};
use barfill_core::domain::Bar;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open bar file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognized timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("bar file contains no rows")]
    Empty,

    #[error("invalid bars: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: String,
    #[serde(with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    close: Decimal,
    #[serde(default)]
    volume: u64,
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Read bars from any CSV source.
pub fn read_bars<R: io::Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (row, record) in csv_reader.deserialize::<BarRow>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        bars.push(Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    validate_bars(&bars)?;
    Ok(bars)
}

/// Load and validate bars from a CSV file.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_bars(io::BufReader::new(file))?;
    tracing::debug!(path = %path.display(), bars = bars.len(), "loaded bars");
    Ok(bars)
}
