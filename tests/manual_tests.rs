mod common;

use common::{RecordingNotifier, Sent, job, mins, setup_test_db, t0, titles};
use geotimer::core::manual::ManualLogic;
use geotimer::core::outcome::Outcome;
use geotimer::db::initialize::open_db;
use geotimer::db::pool::DbPool;
use geotimer::db::queries;
use geotimer::errors::AppError;
use geotimer::models::action_kind::ActionKind;
use geotimer::models::pending_action::PendingAction;
use geotimer::models::session::ActiveSession;
use std::sync::{Arc, Mutex};

fn pool_with_jobs(name: &str, ids: &[&str]) -> DbPool {
    let pool = open_db(&setup_test_db(name)).expect("open db");
    for id in ids {
        queries::upsert_job(&pool.conn, &job(id, 10, 10)).expect("add job");
    }
    pool
}

fn recorder() -> (RecordingNotifier, Sent) {
    let sent: Sent = Arc::new(Mutex::new(Vec::new()));
    (RecordingNotifier { sent: sent.clone() }, sent)
}

fn pending(pool: &DbPool, job_id: &str, kind: ActionKind) {
    queries::save_pending_action(&pool.conn, &PendingAction::new(job_id, kind, 10, t0()))
        .expect("save pending");
}

#[test]
fn cancel_filters_by_job_and_kind() {
    let mut pool = pool_with_jobs("man_cancel", &["A", "B"]);
    pending(&pool, "A", ActionKind::Start);
    pending(&pool, "B", ActionKind::Stop);

    let cancelled = ManualLogic::cancel(&mut pool, Some("A"), None).unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].job_id, "A");
    assert!(
        queries::load_pending_action(&pool.conn, "B", ActionKind::Stop)
            .unwrap()
            .is_some()
    );

    let none = ManualLogic::cancel(&mut pool, None, Some(ActionKind::Start)).unwrap();
    assert!(none.is_empty());

    let rest = ManualLogic::cancel(&mut pool, None, None).unwrap();
    assert_eq!(rest.len(), 1);
    assert!(queries::load_pending_actions(&pool.conn).unwrap().is_empty());
}

#[test]
fn cancel_for_unknown_job_is_an_error() {
    let mut pool = pool_with_jobs("man_cancel_unknown", &["A"]);
    let err = ManualLogic::cancel(&mut pool, Some("ghost"), None).unwrap_err();
    assert!(matches!(err, AppError::JobNotFound(_)));
}

#[test]
fn stop_closes_session_and_cancels_countdowns() {
    let mut pool = pool_with_jobs("man_stop", &["A"]);
    queries::save_active_session(&pool.conn, &ActiveSession::auto_started("A", t0())).unwrap();
    pending(&pool, "A", ActionKind::Stop);
    let (notifier, sent) = recorder();

    let outcome = ManualLogic::stop(&mut pool, &notifier, "A", mins(90)).unwrap();
    assert!(matches!(outcome, Outcome::Stopped { hours, .. } if hours == 1.5));

    assert!(queries::load_active_session(&pool.conn, "A").unwrap().is_none());
    assert!(queries::load_pending_actions(&pool.conn).unwrap().is_empty());
    let records = queries::load_work_records(&pool.conn, Some("A")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actual_end_time, mins(90));
    assert_eq!(titles(&sent), vec!["Timer stopped"]);
}

#[test]
fn stop_without_session_still_cancels_a_countdown() {
    let mut pool = pool_with_jobs("man_stop_idle", &["A"]);
    pending(&pool, "A", ActionKind::Start);
    let (notifier, sent) = recorder();

    let outcome = ManualLogic::stop(&mut pool, &notifier, "A", mins(5)).unwrap();
    assert_eq!(outcome, Outcome::NoSession);
    assert!(queries::load_pending_actions(&pool.conn).unwrap().is_empty());
    assert!(titles(&sent).is_empty());
}

#[test]
fn stop_before_session_start_is_refused() {
    let mut pool = pool_with_jobs("man_stop_early", &["A"]);
    queries::save_active_session(&pool.conn, &ActiveSession::auto_started("A", mins(60))).unwrap();
    let (notifier, _sent) = recorder();

    let err = ManualLogic::stop(&mut pool, &notifier, "A", mins(30)).unwrap_err();
    assert!(matches!(err, AppError::InvalidTimestamp(_)));
    assert!(queries::load_active_session(&pool.conn, "A").unwrap().is_some());
    assert!(queries::load_work_records(&pool.conn, None).unwrap().is_empty());
}
