use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::colors::{GREY, RESET, color_for_inside, colorize_optional};
use crate::utils::formatting::{bold, local_hm, local_ts, mins2readable};
use crate::utils::table::{Column, Table};
use crate::utils::time::elapsed_minutes;
use chrono::{DateTime, Utc};

pub struct StatusLogic;

impl StatusLogic {
    /// Mode, per-job geofence state, pending actions and running sessions.
    pub fn print(pool: &mut DbPool, now: DateTime<Utc>) -> AppResult<()> {
        let conn = &pool.conn;
        let mode = queries::load_mode(conn)?;
        let jobs = queries::load_jobs(conn)?;
        let states = queries::load_runtime_states(conn)?;
        let pending = queries::load_pending_actions(conn)?;
        let sessions = queries::load_active_sessions(conn)?;

        header("geotimer status");
        println!("🛰️  Auto-timer mode: {} ({})\n", bold(mode.code()), mode.description());

        if jobs.is_empty() {
            println!("⚠️  No jobs configured.");
        } else {
            let mut table = Table::new(vec![
                Column { header: "JOB".into(), width: 12 },
                Column { header: "STATE".into(), width: 8 },
                Column { header: "LAST TRANSITION".into(), width: 19 },
                Column { header: "SESSION".into(), width: 14 },
            ]);

            for job in &jobs {
                let state = states.iter().find(|s| s.job_id == job.job_id);
                let (where_, color) = match state {
                    _ if !job.enabled => ("disabled".to_string(), GREY),
                    Some(s) if s.is_inside => ("inside".to_string(), color_for_inside(true)),
                    Some(_) => ("outside".to_string(), color_for_inside(false)),
                    None => ("--".to_string(), GREY),
                };
                let last = state
                    .and_then(|s| s.last_transition_at.as_ref())
                    .map(local_ts)
                    .unwrap_or_else(|| "--".into());
                let session = sessions
                    .iter()
                    .find(|s| s.job_id == job.job_id)
                    .map(|s| {
                        format!(
                            "since {} ({})",
                            local_hm(&s.start_time),
                            mins2readable(elapsed_minutes(s.start_time, now), false, true)
                        )
                    })
                    .unwrap_or_else(|| "--".into());

                table.add_row(vec![job.job_id.clone(), where_, last, session]);
                // colore solo sulla colonna di stato
                if let Some(row) = table.rows.last_mut() {
                    row[1] = format!("{color}{}{RESET}", row[1]);
                    row[2] = colorize_optional(&row[2]);
                    row[3] = colorize_optional(&row[3]);
                }
            }
            print!("{}", table.render());
        }

        if !pending.is_empty() {
            println!("\n⏳ Pending actions:");
            for p in &pending {
                let eta = if p.is_due(now) {
                    "due now".to_string()
                } else {
                    format!("in {}", mins2readable(elapsed_minutes(now, p.target_time), false, false))
                };
                println!(
                    "   {} {:<5} at {} ({})",
                    p.job_id,
                    p.kind,
                    local_ts(&p.target_time),
                    eta
                );
            }
        }

        // sessioni di job non più configurati
        for s in sessions.iter().filter(|s| !jobs.iter().any(|j| j.job_id == s.job_id)) {
            println!(
                "\n⚠️  Session for unknown job '{}' running since {}",
                s.job_id,
                local_ts(&s.start_time)
            );
        }

        Ok(())
    }

    /// Work records written by the engine, optionally for one job.
    pub fn print_records(pool: &mut DbPool, job_id: Option<&str>) -> AppResult<()> {
        let records = queries::load_work_records(&pool.conn, job_id)?;
        if records.is_empty() {
            println!("⚠️  No work records found.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column { header: "ID".into(), width: 4 },
            Column { header: "DATE".into(), width: 10 },
            Column { header: "JOB".into(), width: 12 },
            Column { header: "START".into(), width: 5 },
            Column { header: "END".into(), width: 5 },
            Column { header: "HOURS".into(), width: 6 },
            Column { header: "NOTES".into(), width: 10 },
        ]);

        let mut total = 0.0;
        for r in &records {
            total += r.hours;
            table.add_row(vec![
                r.id.to_string(),
                r.date.format("%Y-%m-%d").to_string(),
                r.job_id.clone(),
                local_hm(&r.actual_start_time),
                local_hm(&r.actual_end_time),
                format!("{:.2}", r.hours),
                r.notes.clone(),
            ]);
        }

        println!("🗂️  Work records:\n");
        print!("{}", table.render());
        println!("\nTotal: {} h", bold(&format!("{total:.2}")));
        Ok(())
    }
}
