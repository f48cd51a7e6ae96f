use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::mode;
use crate::db::initialize::open_db;
use crate::db::queries;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Mode { mode: requested } = cmd {
        let mut pool = open_db(&cfg.database)?;

        match requested {
            None => {
                let current = queries::load_mode(&pool.conn)?;
                info(format!(
                    "Auto-timer mode: {} ({})",
                    current,
                    current.description()
                ));
            }
            Some(new_mode) => {
                let previous = mode::set(&mut pool, *new_mode)?;
                success(format!(
                    "Auto-timer mode: {} → {} ({})",
                    previous,
                    new_mode,
                    new_mode.description()
                ));
            }
        }
    }

    Ok(())
}
