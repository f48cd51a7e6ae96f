//! Deferred start/stop actions.
//!
//! At most one action per (job, kind) exists; a newer one replaces the
//! older. Scheduling a kind always removes the opposite kind first.

use crate::core::notifier::Notice;
use crate::core::outcome::Outcome;
use crate::db::log::ttlog;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{action_kind::ActionKind, job::JobGeofence, pending_action::PendingAction};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Remove the pending `kind` of `job_id`, logging `reason`. Returns whether one existed.
pub fn cancel(conn: &Connection, job_id: &str, kind: ActionKind, reason: &str) -> AppResult<bool> {
    let removed = queries::delete_pending_action(conn, job_id, kind)?;
    if removed {
        ttlog(
            conn,
            "pending_cancelled",
            job_id,
            &format!("Pending {kind} cancelled by {reason}"),
        )?;
        tracing::debug!(job_id, %kind, reason, "pending action cancelled");
    }
    Ok(removed)
}

/// Remove the pending action that `kind` supersedes. Returns whether one existed.
pub fn cancel_opposite(conn: &Connection, job_id: &str, kind: ActionKind) -> AppResult<bool> {
    cancel(conn, job_id, kind.opposite(), kind.to_db_str())
}

/// Persist a deferred `kind` for `job`, due `delay_minutes` after `now`.
///
/// A start while a session is running, or a stop without one, is refused
/// with a warning and leaves storage as it was (apart from the opposite
/// action, which the accepted transition has already made stale).
pub fn schedule(
    conn: &Connection,
    job: &JobGeofence,
    kind: ActionKind,
    delay_minutes: u32,
    now: DateTime<Utc>,
    notices: &mut Vec<Notice>,
) -> AppResult<Outcome> {
    cancel_opposite(conn, &job.job_id, kind)?;

    let has_session = queries::load_active_session(conn, &job.job_id)?.is_some();
    let refusal = match kind {
        ActionKind::Start if has_session => Some("start requested while a session is running"),
        ActionKind::Stop if !has_session => Some("stop requested with no running session"),
        _ => None,
    };
    if let Some(why) = refusal {
        tracing::warn!(job_id = %job.job_id, %kind, "{why}");
        return Ok(Outcome::Ignored(why.to_string()));
    }

    let action = PendingAction::new(&job.job_id, kind, delay_minutes, now);
    queries::save_pending_action(conn, &action)?;
    ttlog(
        conn,
        "pending_scheduled",
        &job.job_id,
        &format!(
            "Pending {} in {} min (target {})",
            kind,
            delay_minutes,
            action.target_time.to_rfc3339()
        ),
    )?;

    notices.push(Notice::Scheduled {
        job_name: job.name.clone(),
        kind,
        delay_minutes,
        target_time: action.target_time,
    });

    Ok(Outcome::Scheduled {
        kind,
        target_time: action.target_time,
    })
}
