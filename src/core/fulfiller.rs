//! Executes pending actions whose target time has passed.
//!
//! Each action is fulfilled as of its own `target_time`, so a stop that
//! was due at 18:10 closes the session at 18:10 even when the sweep runs
//! later. One transaction per action. Rows that no longer parse are
//! dropped with a `pending_dropped` log line so they cannot wedge the sweep.

use crate::core::notifier::{self, Notice, Notifier};
use crate::core::outcome::Outcome;
use crate::core::session;
use crate::db::log::{ttlog, ttlog_quiet};
use crate::db::pool::DbPool;
use crate::db::queries::{self, PendingRow};
use crate::errors::{AppError, AppResult};
use crate::models::{action_kind::ActionKind, pending_action::PendingAction};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Fulfilment {
    pub action: PendingAction,
    pub outcome: Outcome,
}

/// Fulfil every action due at `now`, oldest first.
///
/// A failure on one action is rolled back and reported; the others still run.
pub fn sweep_due(
    pool: &mut DbPool,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> AppResult<Vec<Fulfilment>> {
    let due = queries::load_due_pending_rows(&pool.conn, now)?;
    let mut done = Vec::with_capacity(due.len());

    for row in due {
        let action = match row {
            PendingRow::Readable(action) => action,
            PendingRow::Unreadable { job_id, kind, error } => {
                drop_unreadable(pool, &job_id, &kind, &error);
                continue;
            }
        };
        let outcome = match fulfil_one(pool, &action, now) {
            Ok((outcome, notices)) => {
                notifier::dispatch(notifier, &notices);
                outcome
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %action.job_id,
                    kind = %action.kind,
                    error = %e,
                    "pending action failed, will retry on next sweep"
                );
                ttlog_quiet(
                    &pool.conn,
                    "pending_failed",
                    &action.job_id,
                    &format!("Pending {} failed: {}", action.kind, e),
                );
                Outcome::Failed(e.to_string())
            }
        };
        done.push(Fulfilment { action, outcome });
    }

    Ok(done)
}

/// Remove a row that can never be fulfilled. Best-effort: a failure here
/// is logged and the row is tried again on the next sweep.
fn drop_unreadable(pool: &mut DbPool, job_id: &str, kind: &str, error: &str) {
    tracing::warn!(job_id, kind, error, "dropping unreadable pending action");

    let res = pool.write_tx().map_err(AppError::from).and_then(|tx| {
        queries::delete_pending_row(&tx, job_id, kind)?;
        ttlog(
            &tx,
            "pending_dropped",
            job_id,
            &format!("Unreadable pending {kind}: {error}"),
        )?;
        tx.commit()?;
        Ok(())
    });
    if let Err(e) = res {
        tracing::warn!(job_id, kind, error = %e, "failed to drop unreadable pending action");
    }
}

fn fulfil_one(
    pool: &mut DbPool,
    action: &PendingAction,
    now: DateTime<Utc>,
) -> AppResult<(Outcome, Vec<Notice>)> {
    let tx = pool.write_tx()?;
    let mut notices = Vec::new();

    // Another writer may have replaced or removed it since the scan.
    let current = queries::load_pending_action(&tx, &action.job_id, action.kind)?;
    let Some(current) = current.filter(|c| c.is_due(now)) else {
        return Ok((Outcome::Ignored("superseded".into()), notices));
    };
    queries::delete_pending_action(&tx, &current.job_id, current.kind)?;

    let job = queries::load_job(&tx, &current.job_id)?;
    let outcome = match job {
        Some(job) if job.enabled => {
            let at = current.target_time;
            let outcome = match current.kind {
                ActionKind::Start => session::start(&tx, &job, at, &mut notices)?,
                ActionKind::Stop => session::stop(&tx, &job, at, &mut notices)?,
            };
            ttlog(
                &tx,
                "pending_fulfilled",
                &current.job_id,
                &format!("Pending {} fulfilled: {}", current.kind, outcome),
            )?;
            outcome
        }
        Some(_) => {
            tracing::warn!(job_id = %current.job_id, kind = %current.kind, "dropping pending action of disabled job");
            ttlog(&tx, "pending_dropped", &current.job_id, "Job disabled")?;
            Outcome::Ignored("job disabled".into())
        }
        None => {
            tracing::warn!(job_id = %current.job_id, kind = %current.kind, "dropping pending action of unknown job");
            ttlog(&tx, "pending_dropped", &current.job_id, "Job not found")?;
            Outcome::Ignored("job not found".into())
        }
    };

    tx.commit()?;
    Ok((outcome, notices))
}
