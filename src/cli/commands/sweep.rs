use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::Engine;
use crate::core::notifier;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::time::parse_optional_instant;
use chrono::Utc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sweep { at } = cmd {
        let now = parse_optional_instant(at.as_ref())?.unwrap_or_else(Utc::now);

        let mut engine = Engine::open(&cfg.database, notifier::from_config(cfg))?;
        let done = engine.sweep(now)?;

        if done.is_empty() {
            info("No pending actions due.");
        }
        for f in &done {
            println!("⏰ {} {}: {}", f.action.job_id, f.action.kind, f.outcome);
        }
    }

    Ok(())
}
