use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::audit::AuditKind;
use ansi_term::Colour;
use chrono::Local;
use regex::Regex;
use std::sync::OnceLock;

const OP_MAX_WIDTH: usize = 60;

fn strip_ansi(s: &str) -> String {
    static ANSI: OnceLock<Option<Regex>> = OnceLock::new();
    match ANSI.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok()) {
        Some(re) => re.replace_all(s, "").into_owned(),
        None => s.to_string(),
    }
}

/// Colore per operazione del log interno
fn color_for_operation(op: &str) -> Colour {
    match op {
        "session_started" => Colour::Green,
        "session_stopped" => Colour::Red,
        "pending_scheduled" | "pending_fulfilled" => Colour::Yellow,
        "pending_cancelled" | "pending_dropped" => Colour::RGB(255, 153, 51), // arancione
        "pending_failed" | "job_error" => Colour::Red,
        "migration_applied" => Colour::Purple,
        "init" | "mode" => Colour::Blue,
        other if other.starts_with("job_") => Colour::Cyan,
        _ => Colour::White,
    }
}

fn color_for_audit(kind: AuditKind) -> Colour {
    match kind {
        AuditKind::Enter => Colour::Green,
        AuditKind::Exit => Colour::Red,
        AuditKind::Debounced => Colour::Yellow,
        AuditKind::Error => Colour::Purple,
    }
}

/// Shorten to `max` visible characters, keeping only the first word coloured.
fn paint_op_target(color: Colour, op_target: &str, max: usize) -> String {
    let visible = strip_ansi(op_target);
    let truncated = if visible.chars().count() > max {
        let mut s = visible.chars().take(max - 3).collect::<String>();
        s.push_str("...");
        s
    } else {
        visible
    };

    match truncated.split_once(' ') {
        Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
        None => color.paint(truncated.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    /// Print the internal operation log.
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let raw_date: String = row.get(1)?;
            let operation: String = row.get(2)?;
            let target: String = row.get(3)?;
            let message: String = row.get(4)?;

            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            // Unica colonna op+target
            let op_target = if target.is_empty() {
                operation.clone()
            } else {
                format!("{operation} ({target})")
            };

            Ok((id, date, operation, op_target, message))
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let op_w = entries
            .iter()
            .map(|(_, _, _, op_target, _)| op_target.chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_MAX_WIDTH);
        let id_w = entries
            .iter()
            .map(|(id, _, _, _, _)| id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries
            .iter()
            .map(|(_, date, _, _, _)| date.len())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for (id, date, operation, op_target, message) in entries {
            let painted = paint_op_target(color_for_operation(&operation), &op_target, OP_MAX_WIDTH);

            // padding calcolato SENZA ANSI
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&painted).chars().count()));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                id,
                date,
                painted,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }

    /// Print the geofence diagnostic ring buffer, oldest first.
    pub fn print_audit(pool: &mut DbPool) -> AppResult<()> {
        let entries = queries::load_audit(&pool.conn)?;

        if entries.is_empty() {
            println!("📡 Geofence log is empty.");
            return Ok(());
        }

        println!("📡 Geofence log (last {} entries):\n", entries.len());

        let job_w = entries.iter().map(|e| e.job_id.len()).max().unwrap_or(6);

        for e in entries {
            let kind = format!("{:<9}", e.kind.to_db_str());
            println!(
                "{} | {} | {:<job_w$} | {:>9.1} m / {:>6.0} m | {}",
                e.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                color_for_audit(e.kind).paint(kind),
                e.job_id,
                e.distance,
                e.radius,
                e.message,
                job_w = job_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colour_codes() {
        let painted = Colour::Green.paint("session_started").to_string();
        assert_eq!(strip_ansi(&painted), "session_started");
    }

    #[test]
    fn long_targets_are_truncated() {
        let long = format!("pending_scheduled ({})", "x".repeat(80));
        let out = strip_ansi(&paint_op_target(Colour::Yellow, &long, 20));
        assert_eq!(out.chars().count(), 20);
        assert!(out.ends_with("..."));
    }
}
