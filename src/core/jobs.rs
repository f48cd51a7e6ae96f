use crate::core::outcome::Outcome;
use crate::core::session;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::job::JobGeofence;
use crate::utils::formatting::coords;
use crate::utils::table::{Column, Table};
use chrono::Utc;

pub struct JobLogic;

impl JobLogic {
    /// Insert or update a job. Returns true when the job is new.
    pub fn add(pool: &mut DbPool, job: &JobGeofence) -> AppResult<bool> {
        let tx = pool.write_tx()?;
        let existed = queries::load_job(&tx, &job.job_id)?.is_some();
        queries::upsert_job(&tx, job)?;
        ttlog(
            &tx,
            if existed { "job_updated" } else { "job_added" },
            &job.job_id,
            &format!(
                "{} at {} r={}m delays {}/{} min{}",
                job.name,
                coords(job.latitude, job.longitude),
                job.radius_meters,
                job.delay_start_minutes,
                job.delay_stop_minutes,
                if job.enabled { "" } else { " (disabled)" }
            ),
        )?;
        tx.commit()?;
        Ok(!existed)
    }

    /// Enable or disable a job. Disabling drops its pending actions,
    /// whose count is returned.
    pub fn set_enabled(pool: &mut DbPool, job_id: &str, enabled: bool) -> AppResult<usize> {
        let tx = pool.write_tx()?;

        if let Some(job) = queries::load_job(&tx, job_id)?
            && enabled
            && !job.has_usable_radius()
        {
            return Err(AppError::InvalidJob(format!(
                "radius must be a finite number > 0 for enabled job '{job_id}'"
            )));
        }
        if !queries::set_job_enabled(&tx, job_id, enabled)? {
            return Err(AppError::JobNotFound(job_id.to_string()));
        }

        let dropped = if enabled {
            0
        } else {
            queries::delete_pending_actions_for_job(&tx, job_id)?
        };
        ttlog(
            &tx,
            if enabled { "job_enabled" } else { "job_disabled" },
            job_id,
            &format!("{dropped} pending action(s) dropped"),
        )?;
        tx.commit()?;
        Ok(dropped)
    }

    /// Delete a job. A running session is closed now so its time is kept.
    pub fn delete(pool: &mut DbPool, job_id: &str) -> AppResult<Option<Outcome>> {
        let tx = pool.write_tx()?;
        let Some(job) = queries::load_job(&tx, job_id)? else {
            return Err(AppError::JobNotFound(job_id.to_string()));
        };

        let closed = if queries::load_active_session(&tx, job_id)?.is_some() {
            let mut notices = Vec::new();
            Some(session::stop(&tx, &job, Utc::now(), &mut notices)?)
        } else {
            None
        };

        queries::delete_job(&tx, job_id)?;
        ttlog(&tx, "job_deleted", job_id, &format!("{} deleted", job.name))?;
        tx.commit()?;
        Ok(closed)
    }

    pub fn list(pool: &mut DbPool) -> AppResult<()> {
        let jobs = queries::load_jobs(&pool.conn)?;
        if jobs.is_empty() {
            println!("⚠️  No jobs configured.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column { header: "ID".into(), width: 12 },
            Column { header: "NAME".into(), width: 18 },
            Column { header: "SITE".into(), width: 24 },
            Column { header: "RADIUS".into(), width: 8 },
            Column { header: "START".into(), width: 6 },
            Column { header: "STOP".into(), width: 6 },
            Column { header: "ENABLED".into(), width: 7 },
        ]);
        for j in &jobs {
            table.add_row(vec![
                j.job_id.clone(),
                j.name.clone(),
                coords(j.latitude, j.longitude),
                format!("{:.0}m", j.radius_meters),
                format!("{}m", j.delay_start_minutes),
                format!("{}m", j.delay_stop_minutes),
                if j.enabled { "yes" } else { "no" }.to_string(),
            ]);
        }

        println!("📍 Jobs:\n");
        print!("{}", table.render());
        Ok(())
    }
}
