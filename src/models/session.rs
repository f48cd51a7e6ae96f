use chrono::{DateTime, Utc};
use serde::Serialize;

pub const AUTO_STARTED_NOTE: &str = "auto-started";

/// A running timer for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveSession {
    pub job_id: String,
    pub start_time: DateTime<Utc>,
    pub notes: String,
}

impl ActiveSession {
    pub fn auto_started(job_id: &str, start_time: DateTime<Utc>) -> Self {
        Self {
            job_id: job_id.to_string(),
            start_time,
            notes: AUTO_STARTED_NOTE.to_string(),
        }
    }
}
