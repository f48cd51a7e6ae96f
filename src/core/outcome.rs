use crate::models::action_kind::{ActionKind, Transition};
use crate::models::work_record::RecordId;
use chrono::{DateTime, Local, Utc};
use std::fmt;

/// What evaluating one job (or fulfilling one pending action) led to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No crossing: the job stays on the same side.
    Unchanged { inside: bool },
    /// Crossing dropped by the debounce window.
    Debounced(Transition),
    /// Deferred action persisted.
    Scheduled {
        kind: ActionKind,
        target_time: DateTime<Utc>,
    },
    Started,
    /// Start requested while a session already runs: nothing to do.
    AlreadyRunning,
    Stopped { record_id: RecordId, hours: f64 },
    /// Stop requested without a running session: nothing to do.
    NoSession,
    /// Request refused as a no-op (invariant guard, job gone or disabled).
    Ignored(String),
    /// Job cannot be evaluated as configured.
    Skipped(String),
    /// Processing failed and was rolled back.
    Failed(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Unchanged { inside: true } => write!(f, "inside, no change"),
            Outcome::Unchanged { inside: false } => write!(f, "outside, no change"),
            Outcome::Debounced(t) => write!(f, "{t} debounced"),
            Outcome::Scheduled { kind, target_time } => write!(
                f,
                "{} scheduled at {}",
                kind,
                target_time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            ),
            Outcome::Started => write!(f, "session started"),
            Outcome::AlreadyRunning => write!(f, "session already running"),
            Outcome::Stopped { record_id, hours } => {
                write!(f, "session stopped, record #{record_id} ({hours:.2}h)")
            }
            Outcome::NoSession => write!(f, "no session to stop"),
            Outcome::Ignored(why) => write!(f, "ignored: {why}"),
            Outcome::Skipped(why) => write!(f, "skipped: {why}"),
            Outcome::Failed(why) => write!(f, "failed: {why}"),
        }
    }
}
