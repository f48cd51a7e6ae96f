use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// A named, idempotent schema step. Applied steps are recorded in the
/// `log` table with operation `migration_applied` and the version as target.
struct Migration {
    version: &'static str,
    description: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20251002_0001_create_geofence_schema",
        description: "Created jobs, runtime state, pending actions, sessions, work records",
        apply: create_core_tables,
    },
    Migration {
        version: "20251009_0002_add_geofence_log",
        description: "Added geofence_log diagnostic ring buffer",
        apply: create_geofence_log,
    },
    Migration {
        version: "20251014_0003_add_lookup_indexes",
        description: "Added indexes on pending target time and work record date",
        apply: create_indexes,
    },
];

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn create_core_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL,
            latitude            REAL,
            longitude           REAL,
            radius_meters       REAL NOT NULL DEFAULT 100,
            delay_start_minutes INTEGER NOT NULL DEFAULT 0,
            delay_stop_minutes  INTEGER NOT NULL DEFAULT 0,
            enabled             INTEGER NOT NULL DEFAULT 1,
            position            INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS settings (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS geofence_runtime_state (
            job_id             TEXT PRIMARY KEY,
            is_inside          INTEGER NOT NULL DEFAULT 0,
            last_transition_at TEXT
        );

        CREATE TABLE IF NOT EXISTS pending_actions (
            job_id        TEXT NOT NULL,
            kind          TEXT NOT NULL CHECK(kind IN ('start','stop')),
            created_at    TEXT NOT NULL,
            delay_minutes INTEGER NOT NULL,
            target_time   TEXT NOT NULL,
            PRIMARY KEY (job_id, kind)
        );

        CREATE TABLE IF NOT EXISTS active_sessions (
            job_id     TEXT PRIMARY KEY,
            start_time TEXT NOT NULL,
            notes      TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS work_records (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            date              TEXT NOT NULL,
            job_id            TEXT NOT NULL,
            hours             REAL NOT NULL,
            actual_start_time TEXT NOT NULL,
            actual_end_time   TEXT NOT NULL,
            type              TEXT NOT NULL DEFAULT 'work',
            notes             TEXT NOT NULL DEFAULT '',
            overtime          INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )?;
    Ok(())
}

fn create_geofence_log(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS geofence_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            kind      TEXT NOT NULL CHECK(kind IN ('ENTER','EXIT','DEBOUNCED','ERROR')),
            job_id    TEXT NOT NULL,
            distance  REAL NOT NULL DEFAULT 0,
            radius    REAL NOT NULL DEFAULT 0,
            message   TEXT NOT NULL DEFAULT ''
        );
        "#,
    )?;
    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_pending_target ON pending_actions(target_time);
        CREATE INDEX IF NOT EXISTS idx_work_records_date ON work_records(date, job_id);
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Names of the migrations already recorded as applied, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    ensure_log_table(conn)?;
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Public entry point: run all pending migrations.
///
/// Invocata da db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        (m.apply)(conn)?;

        conn.execute(
            "INSERT INTO log (date, operation, target, message)
             VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
            [m.version, m.description],
        )?;

        success(format!("Migration applied: {} → {}", m.version, m.description));
    }

    Ok(())
}
