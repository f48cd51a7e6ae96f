use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::mode::AutoTimerMode;
use rusqlite::Connection;

/// Delay actually applied to a transition.
///
/// `full-background` runs without the host app, so nothing could fire a
/// deferred action later: delays collapse to zero.
pub fn effective_delay(mode: AutoTimerMode, configured_minutes: u32) -> u32 {
    match mode {
        AutoTimerMode::FullBackground => 0,
        AutoTimerMode::ForegroundOnly | AutoTimerMode::BackgroundAllowed => configured_minutes,
    }
}

/// Current mode, read fresh from the settings table.
pub fn current(conn: &Connection) -> AppResult<AutoTimerMode> {
    queries::load_mode(conn)
}

/// Persist a new mode. Takes effect from the next batch.
pub fn set(pool: &mut DbPool, mode: AutoTimerMode) -> AppResult<AutoTimerMode> {
    let tx = pool.write_tx()?;
    let previous = queries::load_mode(&tx)?;
    queries::save_mode(&tx, mode)?;
    ttlog(&tx, "mode", mode.code(), &format!("Mode changed from {previous} to {mode}"))?;
    tx.commit()?;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_background_bypasses_delays() {
        assert_eq!(effective_delay(AutoTimerMode::FullBackground, 10), 0);
        assert_eq!(effective_delay(AutoTimerMode::FullBackground, 0), 0);
    }

    #[test]
    fn other_modes_honour_configured_delay() {
        assert_eq!(effective_delay(AutoTimerMode::ForegroundOnly, 10), 10);
        assert_eq!(effective_delay(AutoTimerMode::BackgroundAllowed, 3), 3);
        assert_eq!(effective_delay(AutoTimerMode::ForegroundOnly, 0), 0);
    }
}
