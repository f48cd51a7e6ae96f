//! Conversions between domain values and their SQLite TEXT representation.

use crate::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;

/// Timestamps are stored as RFC 3339 strings in UTC with millisecond precision.
pub fn ts_to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn parse_ts(s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidTimestamp(s.to_string()))
}

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

/// Read a required timestamp column.
pub fn get_ts(row: &Row, col: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(col)?;
    parse_ts(&raw).map_err(|e| conversion_error(0, e))
}

/// Read a nullable timestamp column.
pub fn get_opt_ts(row: &Row, col: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(col)?;
    raw.map(|s| parse_ts(&s).map_err(|e| conversion_error(0, e)))
        .transpose()
}

pub fn get_date(row: &Row, col: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(col)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| conversion_error(0, AppError::InvalidTimestamp(raw.clone())))
}

/// Wrap a domain parse failure so it can travel through a rusqlite row mapper.
pub fn invalid_column(what: &str, raw: &str) -> rusqlite::Error {
    conversion_error(0, AppError::Other(format!("Invalid {}: {}", what, raw)))
}
