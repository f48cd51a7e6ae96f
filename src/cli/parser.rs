use crate::models::action_kind::ActionKind;
use crate::models::mode::AutoTimerMode;
use clap::{Parser, Subcommand};

/// Command-line interface definition for geotimer
/// Geofence-driven automatic work timer backed by SQLite
#[derive(Parser)]
#[command(
    name = "geotimer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Automatic work timer: start and stop job sessions from geofence crossings",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the configuration in effect")]
        print_config: bool,

        #[arg(long = "check", help = "Add missing keys to the configuration file")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log or the geofence diagnostic log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "audit", help = "Print the geofence log (last 100 crossings)")]
        audit: bool,
    },

    /// Configure the jobs the timer watches
    Job {
        #[command(subcommand)]
        action: JobAction,
    },

    /// Show or change the auto-timer mode
    Mode {
        /// New mode; omit to print the current one
        #[arg(value_enum)]
        mode: Option<AutoTimerMode>,
    },

    /// Feed one location fix to the engine
    Fix {
        #[arg(long = "lat", allow_hyphen_values = true)]
        lat: f64,

        #[arg(long = "lon", allow_hyphen_values = true)]
        lon: f64,

        #[arg(long = "accuracy", help = "Reported accuracy in metres (informational)")]
        accuracy: Option<f64>,

        #[arg(
            long = "at",
            help = "Process as of this instant (RFC 3339 or 'YYYY-MM-DD HH:MM[:SS]')"
        )]
        at: Option<String>,
    },

    /// Fulfil pending actions that are due
    Sweep {
        #[arg(long = "at", help = "Sweep as of this instant instead of now")]
        at: Option<String>,
    },

    /// Cancel running start/stop countdowns
    Cancel {
        /// Only this job's actions (default: every job)
        job: Option<String>,

        #[arg(long = "kind", value_enum, help = "Only actions of this kind")]
        kind: Option<ActionKind>,
    },

    /// Stop a job's running session by hand and record the worked time
    Stop {
        /// Job whose session is closed
        job: String,

        #[arg(long = "at", help = "End the session at this instant instead of now")]
        at: Option<String>,
    },

    /// Read NDJSON location fixes from stdin until EOF
    Watch,

    /// Show mode, per-job state, pending actions and running sessions
    Status,

    /// List work records written by the timer
    Records {
        #[arg(long = "job", help = "Only records of this job")]
        job: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum JobAction {
    /// Add a job or update an existing one
    Add {
        /// Job identifier
        id: String,

        #[arg(long = "name", help = "Display name (defaults to the id)")]
        name: Option<String>,

        #[arg(long = "lat", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long = "lon", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long = "radius", help = "Geofence radius in metres")]
        radius: Option<f64>,

        #[arg(long = "delay-start", default_value_t = 0, help = "Minutes to wait before starting (max one week)")]
        delay_start: u32,

        #[arg(long = "delay-stop", default_value_t = 0, help = "Minutes to wait before stopping (max one week)")]
        delay_stop: u32,

        #[arg(long = "disabled", help = "Store the job without watching it")]
        disabled: bool,
    },

    /// List configured jobs
    List,

    /// Start watching a job
    Enable { id: String },

    /// Stop watching a job (drops its pending actions)
    Disable { id: String },

    /// Delete a job (closes its running session)
    Del { id: String },
}
