use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide auto-timer mode, persisted under the `autotimer_mode` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AutoTimerMode {
    /// Works while the host app is visible; per-job delays are honoured.
    #[default]
    ForegroundOnly,
    /// Works while the app is open or minimised; delays are honoured.
    BackgroundAllowed,
    /// Works with the app closed; delays are bypassed.
    FullBackground,
}

impl AutoTimerMode {
    pub fn code(&self) -> &'static str {
        match self {
            AutoTimerMode::ForegroundOnly => "foreground-only",
            AutoTimerMode::BackgroundAllowed => "background-allowed",
            AutoTimerMode::FullBackground => "full-background",
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        self.code()
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "foreground-only" => Some(AutoTimerMode::ForegroundOnly),
            "background-allowed" => Some(AutoTimerMode::BackgroundAllowed),
            "full-background" => Some(AutoTimerMode::FullBackground),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AutoTimerMode::ForegroundOnly => "only while the app is open",
            AutoTimerMode::BackgroundAllowed => "while the app is open or minimised",
            AutoTimerMode::FullBackground => "always, delays are skipped",
        }
    }
}

impl fmt::Display for AutoTimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
