//! Repository functions over the persisted key space.
//!
//! Every function takes a plain `&Connection`, so callers can pass either the
//! pooled connection or an open transaction.

use crate::db::db_utils::{get_date, get_opt_ts, get_ts, invalid_column, ts_to_db};
use crate::errors::AppResult;
use crate::models::action_kind::ActionKind;
use crate::models::audit::{AUDIT_CAPACITY, AuditEntry, AuditKind};
use crate::models::job::JobGeofence;
use crate::models::mode::AutoTimerMode;
use crate::models::pending_action::PendingAction;
use crate::models::runtime_state::GeofenceRuntimeState;
use crate::models::session::ActiveSession;
use crate::models::work_record::{RecordId, WorkRecord};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub const MODE_KEY: &str = "autotimer_mode";

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

pub fn map_job(row: &Row) -> Result<JobGeofence> {
    Ok(JobGeofence {
        job_id: row.get("id")?,
        name: row.get("name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        radius_meters: row.get("radius_meters")?,
        delay_start_minutes: row.get("delay_start_minutes")?,
        delay_stop_minutes: row.get("delay_stop_minutes")?,
        enabled: row.get("enabled")?,
    })
}

/// Insert a job, or update it in place (keeping its list position) if the id exists.
pub fn upsert_job(conn: &Connection, job: &JobGeofence) -> AppResult<()> {
    job.validate()?;

    conn.execute(
        "INSERT INTO jobs (id, name, latitude, longitude, radius_meters,
                           delay_start_minutes, delay_stop_minutes, enabled, position, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                 (SELECT IFNULL(MAX(position), 0) + 1 FROM jobs), ?9)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            radius_meters = excluded.radius_meters,
            delay_start_minutes = excluded.delay_start_minutes,
            delay_stop_minutes = excluded.delay_stop_minutes,
            enabled = excluded.enabled",
        params![
            job.job_id,
            job.name,
            job.latitude,
            job.longitude,
            job.radius_meters,
            job.delay_start_minutes,
            job.delay_stop_minutes,
            job.enabled,
            ts_to_db(&Utc::now()),
        ],
    )?;
    Ok(())
}

pub fn load_jobs(conn: &Connection) -> AppResult<Vec<JobGeofence>> {
    let mut stmt = conn.prepare("SELECT * FROM jobs ORDER BY position ASC, created_at ASC")?;
    let rows = stmt.query_map([], map_job)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Enabled jobs in configuration order. Read fresh for every batch.
pub fn load_enabled_jobs(conn: &Connection) -> AppResult<Vec<JobGeofence>> {
    Ok(load_jobs(conn)?.into_iter().filter(|j| j.enabled).collect())
}

pub fn load_job(conn: &Connection, job_id: &str) -> AppResult<Option<JobGeofence>> {
    let job = conn
        .query_row("SELECT * FROM jobs WHERE id = ?1", [job_id], map_job)
        .optional()?;
    Ok(job)
}

/// Returns false when no such job exists.
pub fn set_job_enabled(conn: &Connection, job_id: &str, enabled: bool) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE jobs SET enabled = ?2 WHERE id = ?1",
        params![job_id, enabled],
    )?;
    Ok(n > 0)
}

/// Delete a job together with its runtime state and pending actions.
/// Sessions and work records are left alone.
pub fn delete_job(conn: &Connection, job_id: &str) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM jobs WHERE id = ?1", [job_id])?;
    conn.execute(
        "DELETE FROM geofence_runtime_state WHERE job_id = ?1",
        [job_id],
    )?;
    delete_pending_actions_for_job(conn, job_id)?;
    Ok(n > 0)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub fn load_setting(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn save_setting(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )?;
    Ok(())
}

/// Current auto-timer mode; missing or unreadable values fall back to the default.
pub fn load_mode(conn: &Connection) -> AppResult<AutoTimerMode> {
    match load_setting(conn, MODE_KEY)? {
        None => Ok(AutoTimerMode::default()),
        Some(raw) => Ok(AutoTimerMode::from_db_str(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "unknown auto-timer mode, using default");
            AutoTimerMode::default()
        })),
    }
}

pub fn save_mode(conn: &Connection, mode: AutoTimerMode) -> AppResult<()> {
    save_setting(conn, MODE_KEY, mode.to_db_str())
}

// ---------------------------------------------------------------------------
// Geofence runtime state
// ---------------------------------------------------------------------------

fn map_runtime_state(row: &Row) -> Result<GeofenceRuntimeState> {
    Ok(GeofenceRuntimeState {
        job_id: row.get("job_id")?,
        is_inside: row.get("is_inside")?,
        last_transition_at: get_opt_ts(row, "last_transition_at")?,
    })
}

pub fn load_runtime_state(
    conn: &Connection,
    job_id: &str,
) -> AppResult<Option<GeofenceRuntimeState>> {
    let s = conn
        .query_row(
            "SELECT * FROM geofence_runtime_state WHERE job_id = ?1",
            [job_id],
            map_runtime_state,
        )
        .optional()?;
    Ok(s)
}

pub fn load_runtime_states(conn: &Connection) -> AppResult<Vec<GeofenceRuntimeState>> {
    let mut stmt = conn.prepare("SELECT * FROM geofence_runtime_state ORDER BY job_id ASC")?;
    let rows = stmt.query_map([], map_runtime_state)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn save_runtime_state(conn: &Connection, state: &GeofenceRuntimeState) -> AppResult<()> {
    conn.execute(
        "INSERT INTO geofence_runtime_state (job_id, is_inside, last_transition_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(job_id) DO UPDATE SET
            is_inside = excluded.is_inside,
            last_transition_at = excluded.last_transition_at",
        params![
            state.job_id,
            state.is_inside,
            state.last_transition_at.as_ref().map(ts_to_db),
        ],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Pending actions
// ---------------------------------------------------------------------------

fn map_pending(row: &Row) -> Result<PendingAction> {
    let kind_str: String = row.get("kind")?;
    let kind =
        ActionKind::from_db_str(&kind_str).ok_or_else(|| invalid_column("kind", &kind_str))?;

    Ok(PendingAction {
        job_id: row.get("job_id")?,
        kind,
        created_at: get_ts(row, "created_at")?,
        delay_minutes: row.get("delay_minutes")?,
        target_time: get_ts(row, "target_time")?,
    })
}

pub fn load_pending_action(
    conn: &Connection,
    job_id: &str,
    kind: ActionKind,
) -> AppResult<Option<PendingAction>> {
    let p = conn
        .query_row(
            "SELECT * FROM pending_actions WHERE job_id = ?1 AND kind = ?2",
            [job_id, kind.to_db_str()],
            map_pending,
        )
        .optional()?;
    Ok(p)
}

/// A stored pending action, or the key of one whose columns no longer parse.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingRow {
    Readable(PendingAction),
    Unreadable {
        job_id: String,
        kind: String,
        error: String,
    },
}

fn map_pending_row(row: &Row) -> Result<PendingRow> {
    let job_id: String = row.get("job_id")?;
    let kind: String = row.get("kind")?;
    Ok(match map_pending(row) {
        Ok(action) => PendingRow::Readable(action),
        Err(e) => PendingRow::Unreadable {
            job_id,
            kind,
            error: e.to_string(),
        },
    })
}

/// Every readable pending action. Unreadable rows are reported and left
/// for the fulfiller to drop.
pub fn load_pending_actions(conn: &Connection) -> AppResult<Vec<PendingAction>> {
    let mut stmt =
        conn.prepare("SELECT * FROM pending_actions ORDER BY target_time ASC, job_id ASC")?;
    let rows = stmt.query_map([], map_pending_row)?;
    let mut out = Vec::new();
    for r in rows {
        match r? {
            PendingRow::Readable(action) => out.push(action),
            PendingRow::Unreadable { job_id, kind, error } => {
                tracing::warn!(%job_id, %kind, %error, "skipping unreadable pending action");
            }
        }
    }
    Ok(out)
}

/// Pending rows whose target time is at or before `now`, oldest target first.
///
/// Rows are mapped one at a time, so a corrupt row comes back as
/// [`PendingRow::Unreadable`] instead of failing the whole scan.
pub fn load_due_pending_rows(conn: &Connection, now: DateTime<Utc>) -> AppResult<Vec<PendingRow>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM pending_actions
         WHERE target_time <= ?1
         ORDER BY target_time ASC, job_id ASC",
    )?;
    let rows = stmt.query_map([ts_to_db(&now)], map_pending_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Create or overwrite the action for `(job_id, kind)`.
pub fn save_pending_action(conn: &Connection, action: &PendingAction) -> AppResult<()> {
    conn.execute(
        "INSERT INTO pending_actions (job_id, kind, created_at, delay_minutes, target_time)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(job_id, kind) DO UPDATE SET
            created_at = excluded.created_at,
            delay_minutes = excluded.delay_minutes,
            target_time = excluded.target_time",
        params![
            action.job_id,
            action.kind.to_db_str(),
            ts_to_db(&action.created_at),
            action.delay_minutes,
            ts_to_db(&action.target_time),
        ],
    )?;
    Ok(())
}

/// Returns true when a record was removed.
pub fn delete_pending_action(conn: &Connection, job_id: &str, kind: ActionKind) -> AppResult<bool> {
    let n = conn.execute(
        "DELETE FROM pending_actions WHERE job_id = ?1 AND kind = ?2",
        [job_id, kind.to_db_str()],
    )?;
    Ok(n > 0)
}

/// Delete by raw key, for rows whose kind may not parse.
pub fn delete_pending_row(conn: &Connection, job_id: &str, kind: &str) -> AppResult<bool> {
    let n = conn.execute(
        "DELETE FROM pending_actions WHERE job_id = ?1 AND kind = ?2",
        [job_id, kind],
    )?;
    Ok(n > 0)
}

pub fn delete_pending_actions_for_job(conn: &Connection, job_id: &str) -> AppResult<usize> {
    let n = conn.execute("DELETE FROM pending_actions WHERE job_id = ?1", [job_id])?;
    Ok(n)
}

// ---------------------------------------------------------------------------
// Active sessions
// ---------------------------------------------------------------------------

fn map_session(row: &Row) -> Result<ActiveSession> {
    Ok(ActiveSession {
        job_id: row.get("job_id")?,
        start_time: get_ts(row, "start_time")?,
        notes: row.get("notes")?,
    })
}

pub fn load_active_session(conn: &Connection, job_id: &str) -> AppResult<Option<ActiveSession>> {
    let s = conn
        .query_row(
            "SELECT * FROM active_sessions WHERE job_id = ?1",
            [job_id],
            map_session,
        )
        .optional()?;
    Ok(s)
}

pub fn load_active_sessions(conn: &Connection) -> AppResult<Vec<ActiveSession>> {
    let mut stmt = conn.prepare("SELECT * FROM active_sessions ORDER BY start_time ASC")?;
    let rows = stmt.query_map([], map_session)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn save_active_session(conn: &Connection, session: &ActiveSession) -> AppResult<()> {
    conn.execute(
        "INSERT INTO active_sessions (job_id, start_time, notes) VALUES (?1, ?2, ?3)",
        params![session.job_id, ts_to_db(&session.start_time), session.notes],
    )?;
    Ok(())
}

pub fn clear_active_session(conn: &Connection, job_id: &str) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM active_sessions WHERE job_id = ?1", [job_id])?;
    Ok(n > 0)
}

// ---------------------------------------------------------------------------
// Work records
// ---------------------------------------------------------------------------

fn map_work_record(row: &Row) -> Result<WorkRecord> {
    Ok(WorkRecord {
        id: row.get("id")?,
        date: get_date(row, "date")?,
        job_id: row.get("job_id")?,
        hours: row.get("hours")?,
        actual_start_time: get_ts(row, "actual_start_time")?,
        actual_end_time: get_ts(row, "actual_end_time")?,
        kind: row.get("type")?,
        notes: row.get("notes")?,
        overtime: row.get("overtime")?,
    })
}

pub fn add_work_record(conn: &Connection, rec: &WorkRecord) -> AppResult<RecordId> {
    conn.execute(
        "INSERT INTO work_records (date, job_id, hours, actual_start_time, actual_end_time,
                                   type, notes, overtime)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            rec.date.format("%Y-%m-%d").to_string(),
            rec.job_id,
            rec.hours,
            ts_to_db(&rec.actual_start_time),
            ts_to_db(&rec.actual_end_time),
            rec.kind,
            rec.notes,
            rec.overtime,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_work_records(conn: &Connection, job_id: Option<&str>) -> AppResult<Vec<WorkRecord>> {
    let mut out = Vec::new();
    match job_id {
        Some(id) => {
            let mut stmt =
                conn.prepare("SELECT * FROM work_records WHERE job_id = ?1 ORDER BY id ASC")?;
            for r in stmt.query_map([id], map_work_record)? {
                out.push(r?);
            }
        }
        None => {
            let mut stmt = conn.prepare("SELECT * FROM work_records ORDER BY id ASC")?;
            for r in stmt.query_map([], map_work_record)? {
                out.push(r?);
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Geofence diagnostic log (ring buffer)
// ---------------------------------------------------------------------------

/// Append an entry and prune everything older than the newest `AUDIT_CAPACITY`.
pub fn append_audit(
    conn: &Connection,
    at: DateTime<Utc>,
    kind: AuditKind,
    job_id: &str,
    distance: f64,
    radius: f64,
    message: &str,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO geofence_log (timestamp, kind, job_id, distance, radius, message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            ts_to_db(&at),
            kind.to_db_str(),
            job_id,
            distance,
            radius,
            message
        ],
    )?;
    conn.execute(
        "DELETE FROM geofence_log
         WHERE id NOT IN (SELECT id FROM geofence_log ORDER BY id DESC LIMIT ?1)",
        [AUDIT_CAPACITY],
    )?;
    Ok(())
}

/// Oldest first.
pub fn load_audit(conn: &Connection) -> AppResult<Vec<AuditEntry>> {
    let mut stmt = conn.prepare("SELECT * FROM geofence_log ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| {
        let kind_str: String = row.get("kind")?;
        let kind =
            AuditKind::from_db_str(&kind_str).ok_or_else(|| invalid_column("kind", &kind_str))?;
        Ok(AuditEntry {
            id: row.get("id")?,
            timestamp: get_ts(row, "timestamp")?,
            kind,
            job_id: row.get("job_id")?,
            distance: row.get("distance")?,
            radius: row.get("radius")?,
            message: row.get("message")?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
