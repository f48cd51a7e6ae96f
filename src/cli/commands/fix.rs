use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::{BatchReport, Engine};
use crate::core::notifier;
use crate::errors::AppResult;
use crate::models::fix::LocationFix;
use crate::ui::messages::warning;
use crate::utils::time::parse_optional_instant;
use chrono::Utc;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Fix {
        lat,
        lon,
        accuracy,
        at,
    } = cmd
    {
        let now = parse_optional_instant(at.as_ref())?.unwrap_or_else(Utc::now);

        let fix = LocationFix {
            latitude: *lat,
            longitude: *lon,
            timestamp_ms: now.timestamp_millis(),
            accuracy_meters: *accuracy,
        };
        fix.validate()?;

        let mut engine = Engine::open(&cfg.database, notifier::from_config(cfg))?;
        let report = engine.process_batch(&[fix], now)?;
        print_report(&report);
    }

    Ok(())
}

/// One line per fulfilled action and per evaluated job.
pub fn print_report(report: &BatchReport) {
    for f in &report.fulfilled {
        println!(
            "⏰ {} {}: {}",
            f.action.job_id, f.action.kind, f.outcome
        );
    }

    if report.jobs.is_empty() {
        warning("No enabled jobs to evaluate.");
    }
    for j in &report.jobs {
        match j.distance_meters {
            Some(d) => println!("📍 {} ({:.1} m): {}", j.job_id, d, j.outcome),
            None => println!("📍 {}: {}", j.job_id, j.outcome),
        }
    }

    let failures = report.failures();
    if failures > 0 {
        warning(format!("{failures} job(s) failed, see `geotimer log --audit`"));
    }
}
