use chrono::{DateTime, Utc};
use serde::Serialize;

/// Last accepted geofence state of a job.
///
/// `is_inside` follows accepted transitions only; a debounced crossing
/// leaves it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeofenceRuntimeState {
    pub job_id: String,
    pub is_inside: bool,
    pub last_transition_at: Option<DateTime<Utc>>,
}

impl GeofenceRuntimeState {
    /// State of a job that was never evaluated: outside, no transition yet.
    pub fn initial(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            is_inside: false,
            last_transition_at: None,
        }
    }
}
