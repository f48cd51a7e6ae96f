use serde::{Deserialize, Serialize};
use std::fmt;

/// What a pending action (or an immediate transition) does to the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Start,
    Stop,
}

impl ActionKind {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "start" => Some(ActionKind::Start),
            "stop" => Some(ActionKind::Stop),
            _ => None,
        }
    }

    /// The kind that a new action of this kind supersedes.
    pub fn opposite(&self) -> Self {
        match self {
            ActionKind::Start => ActionKind::Stop,
            ActionKind::Stop => ActionKind::Start,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, ActionKind::Start)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Direction of a geofence crossing.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Transition {
    Enter,
    Exit,
}

impl Transition {
    pub fn from_inside(is_inside_now: bool) -> Self {
        if is_inside_now {
            Transition::Enter
        } else {
            Transition::Exit
        }
    }

    /// ENTER starts the timer, EXIT stops it.
    pub fn action(&self) -> ActionKind {
        match self {
            Transition::Enter => ActionKind::Start,
            Transition::Exit => ActionKind::Stop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Enter => "ENTER",
            Transition::Exit => "EXIT",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
