use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::manual::ManualLogic;
use crate::db::initialize::open_db;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::local_ts;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Cancel { job, kind } = cmd {
        let mut pool = open_db(&cfg.database)?;
        let cancelled = ManualLogic::cancel(&mut pool, job.as_deref(), *kind)?;

        if cancelled.is_empty() {
            info("No pending actions to cancel.");
            return Ok(());
        }
        for p in &cancelled {
            println!(
                "🚫 {} {} (was due at {})",
                p.job_id,
                p.kind,
                local_ts(&p.target_time)
            );
        }
        success(format!("{} pending action(s) cancelled.", cancelled.len()));
    }

    Ok(())
}
