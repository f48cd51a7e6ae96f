use crate::cli::parser::{Commands, JobAction};
use crate::config::Config;
use crate::core::jobs::JobLogic;
use crate::db::initialize::open_db;
use crate::errors::{AppError, AppResult};
use crate::models::job::JobGeofence;
use crate::ui::messages::{info, success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Job { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_db(&cfg.database)?;

    match action {
        JobAction::Add {
            id,
            name,
            lat,
            lon,
            radius,
            delay_start,
            delay_stop,
            disabled,
        } => {
            if lat.is_some() != lon.is_some() {
                return Err(AppError::InvalidJob(
                    "--lat and --lon must be given together".into(),
                ));
            }
            let job = JobGeofence {
                job_id: id.clone(),
                name: name.clone().unwrap_or_else(|| id.clone()),
                latitude: *lat,
                longitude: *lon,
                radius_meters: radius.unwrap_or(cfg.default_radius_meters),
                delay_start_minutes: *delay_start,
                delay_stop_minutes: *delay_stop,
                enabled: !*disabled,
            };

            let created = JobLogic::add(&mut pool, &job)?;
            if created {
                success(format!("Job '{}' added.", job.job_id));
            } else {
                success(format!("Job '{}' updated.", job.job_id));
            }
            if job.site().is_none() {
                warning("No site coordinates: the job will not trigger until --lat/--lon are set.");
            }
        }

        JobAction::List => JobLogic::list(&mut pool)?,

        JobAction::Enable { id } => {
            JobLogic::set_enabled(&mut pool, id, true)?;
            success(format!("Job '{id}' enabled."));
        }

        JobAction::Disable { id } => {
            let dropped = JobLogic::set_enabled(&mut pool, id, false)?;
            success(format!("Job '{id}' disabled."));
            if dropped > 0 {
                info(format!("{dropped} pending action(s) dropped."));
            }
        }

        JobAction::Del { id } => {
            if let Some(outcome) = JobLogic::delete(&mut pool, id)? {
                info(format!("Running session closed: {outcome}"));
            }
            success(format!("Job '{id}' deleted."));
        }
    }

    Ok(())
}
