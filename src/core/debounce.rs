//! Per-job debounce of geofence crossings.
//!
//! ENTER and EXIT share one window: any accepted crossing starts it, and
//! any further crossing of the same job inside it is dropped.

use crate::core::geo::Evaluation;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{
    action_kind::Transition, audit::AuditKind, runtime_state::GeofenceRuntimeState,
};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// Minimum spacing between two accepted transitions of the same job.
pub const DEBOUNCE_WINDOW_MS: i64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Accepted,
    Rejected { elapsed_ms: i64 },
}

/// Pure check against the last accepted transition.
///
/// A clock that moved backwards (negative elapsed time) does not hold the
/// job in the window.
pub fn check(last_transition_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Gate {
    match last_transition_at {
        None => Gate::Accepted,
        Some(last) => {
            let elapsed_ms = (now - last).num_milliseconds();
            if (0..DEBOUNCE_WINDOW_MS).contains(&elapsed_ms) {
                Gate::Rejected { elapsed_ms }
            } else {
                Gate::Accepted
            }
        }
    }
}

/// Gate a crossing and record it.
///
/// On acceptance `state` is moved to the new side, stamped with `now` and
/// saved; an ENTER/EXIT line goes to the diagnostic log. On rejection the
/// state is left untouched and a DEBOUNCED line is written instead.
pub fn apply(
    conn: &Connection,
    state: &mut GeofenceRuntimeState,
    eval: &Evaluation,
    radius: f64,
    now: DateTime<Utc>,
) -> AppResult<Gate> {
    let transition = Transition::from_inside(eval.is_inside_now);
    let gate = check(state.last_transition_at, now);

    match gate {
        Gate::Rejected { elapsed_ms } => {
            queries::append_audit(
                conn,
                now,
                AuditKind::Debounced,
                &state.job_id,
                eval.distance_meters,
                radius,
                &format!("{transition} ignored, {elapsed_ms} ms after last transition"),
            )?;
        }
        Gate::Accepted => {
            state.is_inside = eval.is_inside_now;
            state.last_transition_at = Some(now);
            queries::save_runtime_state(conn, state)?;

            let kind = match transition {
                Transition::Enter => AuditKind::Enter,
                Transition::Exit => AuditKind::Exit,
            };
            queries::append_audit(
                conn,
                now,
                kind,
                &state.job_id,
                eval.distance_meters,
                radius,
                &format!("{:.1} m from site (radius {:.0} m)", eval.distance_meters, radius),
            )?;
        }
    }

    Ok(gate)
}
