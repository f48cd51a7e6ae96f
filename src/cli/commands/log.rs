use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print, audit } = cmd {
        let mut pool = DbPool::new(&cfg.database)?;

        if *print {
            LogLogic::print_log(&mut pool)?;
        }
        if *audit {
            if *print {
                println!();
            }
            LogLogic::print_audit(&mut pool)?;
        }
    }

    Ok(())
}
