use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::manual::ManualLogic;
use crate::core::notifier;
use crate::core::outcome::Outcome;
use crate::db::initialize::open_db;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::time::parse_optional_instant;
use chrono::Utc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Stop { job, at } = cmd {
        let at = parse_optional_instant(at.as_ref())?.unwrap_or_else(Utc::now);

        let mut pool = open_db(&cfg.database)?;
        let notifier = notifier::from_config(cfg);
        let outcome = ManualLogic::stop(&mut pool, notifier.as_ref(), job, at)?;

        match outcome {
            Outcome::Stopped { .. } => success(format!("{job}: {outcome}")),
            _ => warning(format!("{job}: {outcome}")),
        }
    }

    Ok(())
}
