use chrono::{DateTime, Utc};
use serde::Serialize;

/// Capacity of the geofence diagnostic ring buffer.
pub const AUDIT_CAPACITY: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditKind {
    Enter,
    Exit,
    Debounced,
    Error,
}

impl AuditKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AuditKind::Enter => "ENTER",
            AuditKind::Exit => "EXIT",
            AuditKind::Debounced => "DEBOUNCED",
            AuditKind::Error => "ERROR",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "ENTER" => Some(AuditKind::Enter),
            "EXIT" => Some(AuditKind::Exit),
            "DEBOUNCED" => Some(AuditKind::Debounced),
            "ERROR" => Some(AuditKind::Error),
            _ => None,
        }
    }
}

/// One line of the geofence diagnostic log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: AuditKind,
    pub job_id: String,
    pub distance: f64,
    pub radius: f64,
    pub message: String,
}
