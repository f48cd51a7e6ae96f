mod common;

use common::{init_db, rti, setup_test_db};
use predicates::prelude::*;
use predicates::str::contains;

fn add_office(db_path: &str, extra: &[&str]) {
    let mut args = vec![
        "--db", db_path, "job", "add", "office", "--name", "Office", "--lat", "45.0", "--lon",
        "9.0", "--radius", "100",
    ];
    args.extend_from_slice(extra);
    rti().args(&args).assert().success().stdout(contains("Job 'office' added"));
}

fn fix(db_path: &str, lat: &str, at: &str) -> assert_cmd::assert::Assert {
    rti()
        .args(["--db", db_path, "fix", "--lat", lat, "--lon", "9.0", "--at", at])
        .assert()
}

#[test]
fn init_creates_schema() {
    let db_path = setup_test_db("cli_init");
    rti()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    rti()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Jobs:"));
}

#[test]
fn job_add_list_and_delete() {
    let db_path = setup_test_db("cli_jobs");
    init_db(&db_path);
    add_office(&db_path, &[]);

    rti()
        .args(["--db", &db_path, "job", "list"])
        .assert()
        .success()
        .stdout(contains("office").and(contains("45.000000, 9.000000")));

    rti()
        .args(["--db", &db_path, "job", "del", "office"])
        .assert()
        .success()
        .stdout(contains("Job 'office' deleted"));

    rti()
        .args(["--db", &db_path, "job", "del", "office"])
        .assert()
        .failure()
        .stderr(contains("Job not found"));
}

#[test]
fn job_add_requires_both_coordinates() {
    let db_path = setup_test_db("cli_half_coords");
    init_db(&db_path);

    rti()
        .args(["--db", &db_path, "job", "add", "half", "--lat", "45.0"])
        .assert()
        .failure()
        .stderr(contains("--lat and --lon"));
}

#[test]
fn enter_then_exit_records_work() {
    let db_path = setup_test_db("cli_enter_exit");
    init_db(&db_path);
    add_office(&db_path, &[]);

    fix(&db_path, "45.0", "2025-10-14T08:00:00Z")
        .success()
        .stdout(contains("session started"));

    rti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("inside").and(contains("foreground-only")));

    fix(&db_path, "45.1", "2025-10-14T09:30:00Z")
        .success()
        .stdout(contains("session stopped").and(contains("1.50h")));

    rti()
        .args(["--db", &db_path, "records", "--job", "office"])
        .assert()
        .success()
        .stdout(contains("1.50").and(contains("[auto] auto-started")));

    rti()
        .args(["--db", &db_path, "log", "--audit"])
        .assert()
        .success()
        .stdout(contains("ENTER").and(contains("EXIT")));
}

#[test]
fn delayed_start_is_fulfilled_by_sweep() {
    let db_path = setup_test_db("cli_sweep");
    init_db(&db_path);
    add_office(&db_path, &["--delay-start", "10"]);

    fix(&db_path, "45.0", "2025-10-14T08:00:00Z")
        .success()
        .stdout(contains("start scheduled"));

    rti()
        .args(["--db", &db_path, "sweep", "--at", "2025-10-14T08:05:00Z"])
        .assert()
        .success()
        .stdout(contains("No pending actions due"));

    rti()
        .args(["--db", &db_path, "sweep", "--at", "2025-10-14T08:11:00Z"])
        .assert()
        .success()
        .stdout(contains("office start: session started"));
}

#[test]
fn disabling_a_job_drops_its_pending_actions() {
    let db_path = setup_test_db("cli_disable");
    init_db(&db_path);
    add_office(&db_path, &["--delay-start", "10"]);

    fix(&db_path, "45.0", "2025-10-14T08:00:00Z").success();

    rti()
        .args(["--db", &db_path, "job", "disable", "office"])
        .assert()
        .success()
        .stdout(contains("1 pending action(s) dropped"));

    fix(&db_path, "45.0", "2025-10-14T08:20:00Z")
        .success()
        .stdout(contains("No enabled jobs"));
}

#[test]
fn mode_can_be_set_and_read_back() {
    let db_path = setup_test_db("cli_mode");
    init_db(&db_path);

    rti()
        .args(["--db", &db_path, "mode"])
        .assert()
        .success()
        .stdout(contains("foreground-only"));

    rti()
        .args(["--db", &db_path, "mode", "full-background"])
        .assert()
        .success();

    rti()
        .args(["--db", &db_path, "mode"])
        .assert()
        .success()
        .stdout(contains("full-background"));

    rti()
        .args(["--db", &db_path, "mode", "sometimes"])
        .assert()
        .failure();
}

#[test]
fn full_background_starts_immediately_despite_delay() {
    let db_path = setup_test_db("cli_full_bg");
    init_db(&db_path);
    add_office(&db_path, &["--delay-start", "10"]);
    rti()
        .args(["--db", &db_path, "mode", "full-background"])
        .assert()
        .success();

    fix(&db_path, "45.0", "2025-10-14T08:00:00Z")
        .success()
        .stdout(contains("session started"));
}

#[test]
fn out_of_range_fix_is_rejected() {
    let db_path = setup_test_db("cli_bad_fix");
    init_db(&db_path);

    fix(&db_path, "95.0", "2025-10-14T08:00:00Z")
        .failure()
        .stderr(contains("latitude"));
}

#[test]
fn watch_reads_ndjson_until_eof() {
    let db_path = setup_test_db("cli_watch");
    init_db(&db_path);
    add_office(&db_path, &[]);

    rti()
        .args(["--db", &db_path, "watch"])
        .write_stdin("{\"latitude\":45.0,\"longitude\":9.0}\nnot json\n\n")
        .assert()
        .success()
        .stdout(contains("session started").and(contains("Processed 1 fix(es), skipped 1")));

    rti()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("session_started"));
}

#[test]
fn job_add_rejects_out_of_range_delay_and_nan_radius() {
    let db_path = setup_test_db("cli_bad_job");
    init_db(&db_path);

    rti()
        .args(["--db", &db_path, "job", "add", "far", "--lat", "45.0", "--lon", "9.0"])
        .args(["--delay-start", "4294967295"])
        .assert()
        .failure()
        .stderr(contains("maximum"));

    rti()
        .args(["--db", &db_path, "job", "add", "nan", "--lat", "45.0", "--lon", "9.0"])
        .args(["--radius", "NaN"])
        .assert()
        .failure()
        .stderr(contains("radius"));

    rti()
        .args(["--db", &db_path, "job", "list"])
        .assert()
        .success()
        .stdout(contains("No jobs configured"));
}

#[test]
fn watch_keeps_going_past_an_unreadable_pending_row() {
    let db_path = setup_test_db("cli_watch_bad_row");
    init_db(&db_path);
    add_office(&db_path, &[]);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "INSERT INTO pending_actions (job_id, kind, created_at, delay_minutes, target_time)
         VALUES ('office', 'stop', '2025-10-14T08:00:00.000Z', 0, '+10191-11-29T12:15:00.000Z')",
        [],
    )
    .unwrap();
    drop(conn);

    rti()
        .args(["--db", &db_path, "watch"])
        .write_stdin("{\"latitude\":45.0,\"longitude\":9.0}\n")
        .assert()
        .success()
        .stdout(contains("session started").and(contains("Processed 1 fix(es)")));

    rti()
        .args(["--db", &db_path, "status"])
        .assert()
        .success()
        .stdout(contains("office"));

    rti()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("pending_dropped"));
}

#[test]
fn cancel_then_manual_stop() {
    let db_path = setup_test_db("cli_manual");
    init_db(&db_path);
    add_office(&db_path, &["--delay-stop", "30"]);

    fix(&db_path, "45.0", "2025-10-14T08:00:00Z")
        .success()
        .stdout(contains("session started"));
    fix(&db_path, "45.1", "2025-10-14T09:00:00Z")
        .success()
        .stdout(contains("stop scheduled"));

    rti()
        .args(["--db", &db_path, "cancel", "office"])
        .assert()
        .success()
        .stdout(contains("1 pending action(s) cancelled"));

    rti()
        .args(["--db", &db_path, "cancel"])
        .assert()
        .success()
        .stdout(contains("No pending actions to cancel"));

    rti()
        .args(["--db", &db_path, "stop", "office", "--at", "2025-10-14T09:30:00Z"])
        .assert()
        .success()
        .stdout(contains("session stopped").and(contains("1.50h")));

    rti()
        .args(["--db", &db_path, "stop", "office"])
        .assert()
        .success()
        .stdout(contains("no session to stop"));

    rti()
        .args(["--db", &db_path, "stop", "ghost"])
        .assert()
        .failure()
        .stderr(contains("Job not found"));
}
