use super::action_kind::ActionKind;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Persisted intent to start or stop a job's timer at `target_time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAction {
    pub job_id: String,
    pub kind: ActionKind,
    pub created_at: DateTime<Utc>,
    pub delay_minutes: u32,
    pub target_time: DateTime<Utc>,
}

impl PendingAction {
    pub fn new(job_id: &str, kind: ActionKind, delay_minutes: u32, now: DateTime<Utc>) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind,
            created_at: now,
            delay_minutes,
            target_time: now + Duration::minutes(i64::from(delay_minutes)),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.target_time
    }
}
