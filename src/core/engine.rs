//! Top-level evaluation of location fixes.

use crate::core::fulfiller::{self, Fulfilment};
use crate::core::notifier::{self, Notice, Notifier};
use crate::core::outcome::Outcome;
use crate::core::{debounce, geo, mode, scheduler, session};
use crate::db::initialize::open_db;
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{
    action_kind::{ActionKind, Transition},
    audit::AuditKind,
    fix::LocationFix,
    job::JobGeofence,
    mode::AutoTimerMode,
    runtime_state::GeofenceRuntimeState,
};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// What happened to one job for one fix.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub job_id: String,
    pub distance_meters: Option<f64>,
    pub outcome: Outcome,
}

/// Everything one batch did, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub now: DateTime<Utc>,
    pub mode: AutoTimerMode,
    pub fulfilled: Vec<Fulfilment>,
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.jobs.iter().filter(|j| j.outcome.is_failure()).count()
            + self
                .fulfilled
                .iter()
                .filter(|f| f.outcome.is_failure())
                .count()
    }
}

/// Owns the store connection and the notifier; processes fixes one batch at a time.
pub struct Engine {
    pool: DbPool,
    notifier: Box<dyn Notifier>,
}

impl Engine {
    pub fn new(pool: DbPool, notifier: Box<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Open (and migrate) the database at `db_path`.
    pub fn open(db_path: &str, notifier: Box<dyn Notifier>) -> AppResult<Self> {
        Ok(Self::new(open_db(db_path)?, notifier))
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    /// Fulfil pending actions due at `now`.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> AppResult<Vec<Fulfilment>> {
        fulfiller::sweep_due(&mut self.pool, self.notifier.as_ref(), now)
    }

    /// Process a batch of fixes at wall-clock `now`.
    ///
    /// Due actions are fulfilled first; then mode and enabled jobs are read
    /// once and every fix is evaluated against every job in order. A job
    /// that fails is rolled back and logged without stopping the others;
    /// a failed sweep is logged the same way.
    pub fn process_batch(
        &mut self,
        fixes: &[LocationFix],
        now: DateTime<Utc>,
    ) -> AppResult<BatchReport> {
        // a broken sweep must not cost the jobs their fix
        let fulfilled = match self.sweep(now) {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!(error = %e, "sweep failed, evaluating fixes anyway");
                ttlog_quiet(&self.pool.conn, "sweep_failed", "", &e.to_string());
                Vec::new()
            }
        };

        let mode = mode::current(&self.pool.conn)?;
        let jobs = queries::load_enabled_jobs(&self.pool.conn)?;
        tracing::debug!(fixes = fixes.len(), jobs = jobs.len(), %mode, "processing batch");

        let mut reports = Vec::with_capacity(fixes.len() * jobs.len());
        for fix in fixes {
            if let Err(e) = fix.validate() {
                tracing::warn!(error = %e, "discarding invalid fix");
                continue;
            }
            for job in &jobs {
                let report = match self.evaluate_job(job, fix, mode, now) {
                    Ok((report, notices)) => {
                        notifier::dispatch(self.notifier.as_ref(), &notices);
                        report
                    }
                    Err(e) => self.record_failure(job, now, &e.to_string()),
                };
                reports.push(report);
            }
        }

        Ok(BatchReport {
            now,
            mode,
            fulfilled,
            jobs: reports,
        })
    }

    fn evaluate_job(
        &mut self,
        job: &JobGeofence,
        fix: &LocationFix,
        mode: AutoTimerMode,
        now: DateTime<Utc>,
    ) -> AppResult<(JobReport, Vec<Notice>)> {
        let mut notices = Vec::new();
        let report = |distance, outcome| JobReport {
            job_id: job.job_id.clone(),
            distance_meters: distance,
            outcome,
        };

        if !job.has_usable_radius() {
            tracing::warn!(job_id = %job.job_id, radius = job.radius_meters, "enabled job with non-positive radius");
            return Ok((
                report(None, Outcome::Skipped("radius must be a finite number > 0".into())),
                notices,
            ));
        }

        let tx = self.pool.write_tx()?;

        let previous = queries::load_runtime_state(&tx, &job.job_id)?;
        // no site: dropping the transaction leaves nothing behind
        let Some(eval) = geo::evaluate(job, fix, previous.as_ref()) else {
            return Ok((report(None, Outcome::Skipped("no site coordinates".into())), notices));
        };
        let first_seen = previous.is_none();
        let mut state = previous.unwrap_or_else(|| GeofenceRuntimeState::initial(&job.job_id));
        let distance = Some(eval.distance_meters);

        if !eval.is_transition() {
            if first_seen {
                queries::save_runtime_state(&tx, &state)?;
            }
            tx.commit()?;
            return Ok((
                report(distance, Outcome::Unchanged { inside: state.is_inside }),
                notices,
            ));
        }

        let transition = Transition::from_inside(eval.is_inside_now);
        if let debounce::Gate::Rejected { .. } =
            debounce::apply(&tx, &mut state, &eval, job.radius_meters, now)?
        {
            if first_seen {
                queries::save_runtime_state(&tx, &state)?;
            }
            tx.commit()?;
            return Ok((report(distance, Outcome::Debounced(transition)), notices));
        }

        let kind = transition.action();
        let delay = mode::effective_delay(mode, job.configured_delay(kind));
        let outcome = if delay > 0 {
            scheduler::schedule(&tx, job, kind, delay, now, &mut notices)?
        } else {
            scheduler::cancel_opposite(&tx, &job.job_id, kind)?;
            match kind {
                ActionKind::Start => session::start(&tx, job, now, &mut notices)?,
                ActionKind::Stop => session::stop(&tx, job, now, &mut notices)?,
            }
        };

        tx.commit()?;
        tracing::info!(job_id = %job.job_id, %transition, %outcome, "geofence transition");
        Ok((report(distance, outcome), notices))
    }

    /// Best-effort trail of a failed job; the transaction is already rolled back.
    fn record_failure(&self, job: &JobGeofence, now: DateTime<Utc>, error: &str) -> JobReport {
        tracing::warn!(job_id = %job.job_id, error, "job evaluation failed, continuing with next job");

        if let Err(e) = queries::append_audit(
            &self.pool.conn,
            now,
            AuditKind::Error,
            &job.job_id,
            0.0,
            job.radius_meters,
            error,
        ) {
            tracing::warn!(job_id = %job.job_id, error = %e, "failed to write geofence log");
        }
        ttlog_quiet(&self.pool.conn, "job_error", &job.job_id, error);

        JobReport {
            job_id: job.job_id.clone(),
            distance_meters: None,
            outcome: Outcome::Failed(error.to_string()),
        }
    }
}
