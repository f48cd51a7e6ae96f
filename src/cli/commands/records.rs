use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::status::StatusLogic;
use crate::db::initialize::open_db;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Records { job } = cmd {
        let mut pool = open_db(&cfg.database)?;
        StatusLogic::print_records(&mut pool, job.as_deref())?;
    }
    Ok(())
}
