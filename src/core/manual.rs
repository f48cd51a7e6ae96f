//! User overrides of the automatic timer.
//!
//! `cancel` aborts running countdowns, `stop` closes a session by hand.
//! Neither touches the geofence runtime state: the next crossing is
//! handled as usual.

use crate::core::notifier::{self, Notifier};
use crate::core::outcome::Outcome;
use crate::core::{scheduler, session};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{action_kind::ActionKind, pending_action::PendingAction};
use crate::utils::formatting::local_ts;
use chrono::{DateTime, Utc};

pub struct ManualLogic;

impl ManualLogic {
    /// Cancel pending actions, optionally only those of one job and/or kind.
    /// Returns what was cancelled.
    pub fn cancel(
        pool: &mut DbPool,
        job_id: Option<&str>,
        kind: Option<ActionKind>,
    ) -> AppResult<Vec<PendingAction>> {
        let tx = pool.write_tx()?;

        if let Some(id) = job_id
            && queries::load_job(&tx, id)?.is_none()
        {
            return Err(AppError::JobNotFound(id.to_string()));
        }

        let targets: Vec<PendingAction> = queries::load_pending_actions(&tx)?
            .into_iter()
            .filter(|p| job_id.is_none_or(|id| p.job_id == id))
            .filter(|p| kind.is_none_or(|k| p.kind == k))
            .collect();

        for p in &targets {
            scheduler::cancel(&tx, &p.job_id, p.kind, "user")?;
        }

        tx.commit()?;
        tracing::info!(cancelled = targets.len(), "pending actions cancelled by user");
        Ok(targets)
    }

    /// Close the running session of `job_id` at `at`, writing its work record.
    /// Pending actions of the job are cancelled with it.
    pub fn stop(
        pool: &mut DbPool,
        notifier: &dyn Notifier,
        job_id: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Outcome> {
        let tx = pool.write_tx()?;
        let Some(job) = queries::load_job(&tx, job_id)? else {
            return Err(AppError::JobNotFound(job_id.to_string()));
        };

        if let Some(running) = queries::load_active_session(&tx, job_id)?
            && at < running.start_time
        {
            return Err(AppError::InvalidTimestamp(format!(
                "{} is before the session start ({})",
                local_ts(&at),
                local_ts(&running.start_time)
            )));
        }

        for kind in [ActionKind::Start, ActionKind::Stop] {
            scheduler::cancel(&tx, job_id, kind, "manual stop")?;
        }

        let mut notices = Vec::new();
        let outcome = session::stop(&tx, &job, at, &mut notices)?;
        ttlog(&tx, "manual_stop", job_id, &format!("Manual stop: {outcome}"))?;
        tx.commit()?;

        notifier::dispatch(notifier, &notices);
        Ok(outcome)
    }
}
