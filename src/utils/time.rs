//! Time utilities: parsing user-supplied instants, elapsed durations.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Parse an instant given on the command line.
///
/// Accepts RFC 3339 (`2025-10-14T08:30:00Z`) or a local
/// `YYYY-MM-DD HH:MM[:SS]`.
pub fn parse_instant(s: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| AppError::InvalidTimestamp(s.to_string()));
        }
    }

    Err(AppError::InvalidTimestamp(s.to_string()))
}

pub fn parse_optional_instant(input: Option<&String>) -> AppResult<Option<DateTime<Utc>>> {
    input.map(|s| parse_instant(s)).transpose()
}

/// Whole minutes from `start` to `end`, never negative.
pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes().max(0)
}
