use crate::config::Config;
use crate::core::status::StatusLogic;
use crate::db::initialize::open_db;
use crate::errors::AppResult;
use chrono::Utc;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut pool = open_db(&cfg.database)?;
    StatusLogic::print(&mut pool, Utc::now())
}
