use super::session::ActiveSession;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

/// Tag prepended to the notes of every record the engine writes.
pub const AUTO_TAG: &str = "[auto]";

/// Smallest amount of hours a closed session is credited with.
pub const MIN_HOURS: f64 = 0.01;

pub type RecordId = i64;

/// Closed work interval handed to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkRecord {
    pub id: RecordId, // 0 until stored
    pub date: NaiveDate,
    pub job_id: String,
    pub hours: f64,
    pub actual_start_time: DateTime<Utc>,
    pub actual_end_time: DateTime<Utc>,
    pub kind: String, // always "work" when emitted here
    pub notes: String,
    pub overtime: bool,
}

impl WorkRecord {
    /// Close `session` at `end`.
    pub fn from_session(session: &ActiveSession, end: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            date: end.with_timezone(&Local).date_naive(),
            job_id: session.job_id.clone(),
            hours: elapsed_hours(session.start_time, end),
            actual_start_time: session.start_time,
            actual_end_time: end,
            kind: "work".to_string(),
            notes: format!("{} {}", AUTO_TAG, session.notes),
            overtime: false,
        }
    }
}

/// Elapsed hours rounded to 2 decimals, never below `MIN_HOURS`.
pub fn elapsed_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let ms = (end - start).num_milliseconds() as f64;
    let hours = (ms / 3_600_000.0 * 100.0).round() / 100.0;
    hours.max(MIN_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 14, 8, 0, 0).unwrap()
    }

    #[test]
    fn hours_are_rounded_to_two_decimals() {
        assert_eq!(elapsed_hours(t0(), t0() + Duration::minutes(90)), 1.5);
        assert_eq!(elapsed_hours(t0(), t0() + Duration::minutes(20)), 0.33);
    }

    #[test]
    fn short_sessions_are_credited_the_minimum() {
        assert_eq!(elapsed_hours(t0(), t0() + Duration::seconds(5)), MIN_HOURS);
        assert_eq!(elapsed_hours(t0(), t0()), MIN_HOURS);
    }

    #[test]
    fn record_is_tagged_as_automatic() {
        let s = ActiveSession::auto_started("office", t0());
        let r = WorkRecord::from_session(&s, t0() + Duration::hours(2));
        assert_eq!(r.notes, "[auto] auto-started");
        assert_eq!(r.kind, "work");
        assert_eq!(r.hours, 2.0);
    }
}
