use crate::cli::commands::fix::print_report;
use crate::config::Config;
use crate::core::engine::Engine;
use crate::core::notifier;
use crate::core::worker::BatchQueue;
use crate::errors::{AppError, AppResult};
use crate::models::fix::LocationFix;
use crate::ui::messages::{info, success, warning};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

/// Read NDJSON fixes from stdin, one batch per line, sweeping due
/// actions every `sweep_interval_secs` in between. Stops at EOF.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let engine = Engine::open(&cfg.database, notifier::from_config(cfg))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(watch(engine, cfg.sweep_interval_secs))
}

async fn watch(engine: Engine, sweep_interval_secs: u64) -> AppResult<()> {
    let (queue, consumer) = BatchQueue::spawn(engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(sweep_interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // il primo tick è immediato

    info("Watching stdin for location fixes (Ctrl-D to stop)…");

    let mut batches = 0usize;
    let mut rejected = 0usize;
    let mut failed = 0usize;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match LocationFix::from_json_line(&line) {
                    Ok(fix) => match queue.submit(vec![fix]).await {
                        Ok(report) => {
                            print_report(&report);
                            batches += 1;
                        }
                        Err(e @ AppError::Queue(_)) => return Err(e),
                        Err(e) => {
                            failed += 1;
                            tracing::warn!(error = %e, "batch failed, still watching");
                            warning(format!("Batch failed: {e}"));
                        }
                    },
                    Err(e) => {
                        rejected += 1;
                        warning(format!("Skipping line: {e}"));
                    }
                }
            }
            _ = ticker.tick() => {
                match queue.sweep(None).await {
                    Ok(done) => {
                        for f in done {
                            println!("⏰ {} {}: {}", f.action.job_id, f.action.kind, f.outcome);
                        }
                    }
                    Err(e @ AppError::Queue(_)) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "periodic sweep failed, still watching");
                        warning(format!("Sweep failed: {e}"));
                    }
                }
            }
        }
    }

    drop(queue);
    consumer
        .await
        .map_err(|e| AppError::Queue(format!("consumer panicked: {e}")))?;

    success(format!(
        "Processed {batches} fix(es), skipped {rejected} invalid line(s)."
    ));
    if failed > 0 {
        warning(format!("{failed} batch(es) failed, see `geotimer log --print`"));
    }
    Ok(())
}
