//! Starting and stopping job sessions.

use crate::core::notifier::Notice;
use crate::core::outcome::Outcome;
use crate::db::log::ttlog;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{job::JobGeofence, session::ActiveSession, work_record::WorkRecord};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Open a session for `job` at `at`. Idempotent: an existing session is kept.
pub fn start(
    conn: &Connection,
    job: &JobGeofence,
    at: DateTime<Utc>,
    notices: &mut Vec<Notice>,
) -> AppResult<Outcome> {
    if queries::load_active_session(conn, &job.job_id)?.is_some() {
        tracing::debug!(job_id = %job.job_id, "session already running");
        return Ok(Outcome::AlreadyRunning);
    }

    let others: Vec<String> = queries::load_active_sessions(conn)?
        .into_iter()
        .map(|s| s.job_id)
        .collect();
    if !others.is_empty() {
        tracing::warn!(
            job_id = %job.job_id,
            running = %others.join(","),
            "starting a session while other jobs are running"
        );
    }

    let session = ActiveSession::auto_started(&job.job_id, at);
    queries::save_active_session(conn, &session)?;
    ttlog(
        conn,
        "session_started",
        &job.job_id,
        &format!("Auto-started at {}", at.to_rfc3339()),
    )?;

    notices.push(Notice::Started {
        job_name: job.name.clone(),
    });
    Ok(Outcome::Started)
}

/// Close the running session of `job` at `at` and hand a work record to the ledger.
pub fn stop(
    conn: &Connection,
    job: &JobGeofence,
    at: DateTime<Utc>,
    notices: &mut Vec<Notice>,
) -> AppResult<Outcome> {
    let Some(session) = queries::load_active_session(conn, &job.job_id)? else {
        tracing::warn!(job_id = %job.job_id, "stop requested with no running session");
        return Ok(Outcome::NoSession);
    };

    let record = WorkRecord::from_session(&session, at);
    let record_id = queries::add_work_record(conn, &record)?;
    queries::clear_active_session(conn, &job.job_id)?;
    ttlog(
        conn,
        "session_stopped",
        &job.job_id,
        &format!("Auto-stopped, record #{} ({:.2}h)", record_id, record.hours),
    )?;

    notices.push(Notice::Stopped {
        job_name: job.name.clone(),
        hours: record.hours,
    });
    Ok(Outcome::Stopped {
        record_id,
        hours: record.hours,
    })
}
