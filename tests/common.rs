#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Duration, TimeZone, Utc};
use geotimer::core::engine::Engine;
use geotimer::core::notifier::Notifier;
use geotimer::db::initialize::open_db;
use geotimer::db::queries;
use geotimer::errors::{AppError, AppResult};
use geotimer::models::fix::LocationFix;
use geotimer::models::job::JobGeofence;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub fn rti() -> Command {
    cargo_bin_cmd!("geotimer")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_geotimer.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// `--db <path> --test init`
pub fn init_db(db_path: &str) {
    rti()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Fixed reference instant so that durations are exact.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 14, 8, 0, 0).unwrap()
}

pub fn secs(n: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(n)
}

pub fn mins(n: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(n)
}

/// On the site of every job built by `job()`.
pub fn inside() -> LocationFix {
    LocationFix::new(0.0, 0.0, 0)
}

/// About 1.1 km north of the site.
pub fn outside() -> LocationFix {
    LocationFix::new(0.01, 0.0, 0)
}

/// Job at (0, 0) with a 100 m radius.
pub fn job(id: &str, delay_start: u32, delay_stop: u32) -> JobGeofence {
    JobGeofence::new(id, 0.0, 0.0, 100.0).with_delays(delay_start, delay_stop)
}

pub type Sent = Arc<Mutex<Vec<(String, String)>>>;

/// Keeps every notification for later inspection.
pub struct RecordingNotifier {
    pub sent: Sent,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Always fails.
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _title: &str, _body: &str) -> AppResult<()> {
        Err(AppError::Notify("no notification channel".into()))
    }
}

/// Fresh database with `jobs` configured, and an engine recording its notifications.
pub fn engine_with_jobs(name: &str, jobs: &[JobGeofence]) -> (Engine, Sent) {
    let db_path = setup_test_db(name);
    let pool = open_db(&db_path).expect("open db");
    for j in jobs {
        queries::upsert_job(&pool.conn, j).expect("add job");
    }

    let sent: Sent = Arc::new(Mutex::new(Vec::new()));
    let engine = Engine::new(pool, Box::new(RecordingNotifier { sent: sent.clone() }));
    (engine, sent)
}

pub fn titles(sent: &Sent) -> Vec<String> {
    sent.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
}
