use crate::errors::{AppError, AppResult};
use serde::Serialize;

/// Longest start/stop delay a job may carry: one week.
pub const MAX_DELAY_MINUTES: u32 = 7 * 24 * 60;

/// Geofence configuration of a job. Read-only to the engine.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobGeofence {
    pub job_id: String,         // ⇔ jobs.id
    pub name: String,           // ⇔ jobs.name (display only)
    pub latitude: Option<f64>,  // ⇔ jobs.latitude
    pub longitude: Option<f64>, // ⇔ jobs.longitude
    pub radius_meters: f64,     // ⇔ jobs.radius_meters
    pub delay_start_minutes: u32,
    pub delay_stop_minutes: u32,
    pub enabled: bool,
}

impl JobGeofence {
    /// Costruttore per un job con coordinate complete.
    /// - `name` uguale all'id
    /// - nessun ritardo
    /// - abilitato
    pub fn new(job_id: &str, latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            job_id: job_id.to_string(),
            name: job_id.to_string(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            radius_meters,
            delay_start_minutes: 0,
            delay_stop_minutes: 0,
            enabled: true,
        }
    }

    pub fn with_delays(mut self, start: u32, stop: u32) -> Self {
        self.delay_start_minutes = start;
        self.delay_stop_minutes = stop;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Site coordinates, when both are configured.
    pub fn site(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// A radius the evaluator can compare against. NaN is never positive.
    pub fn has_usable_radius(&self) -> bool {
        self.radius_meters > 0.0 && self.radius_meters.is_finite()
    }

    /// Reject configurations the engine cannot act on.
    pub fn validate(&self) -> AppResult<()> {
        if self.enabled && !self.has_usable_radius() {
            return Err(AppError::InvalidJob(format!(
                "radius must be a finite number > 0 for enabled job '{}' (got {})",
                self.job_id, self.radius_meters
            )));
        }
        if self.radius_meters.is_nan() {
            return Err(AppError::InvalidJob(format!(
                "radius of job '{}' is not a number",
                self.job_id
            )));
        }
        for (what, minutes) in [
            ("start", self.delay_start_minutes),
            ("stop", self.delay_stop_minutes),
        ] {
            if minutes > MAX_DELAY_MINUTES {
                return Err(AppError::InvalidJob(format!(
                    "{what} delay of job '{}' is {minutes} min, the maximum is {MAX_DELAY_MINUTES}",
                    self.job_id
                )));
            }
        }
        if let Some((lat, lon)) = self.site()
            && (!(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon))
        {
            return Err(AppError::InvalidJob(format!(
                "coordinates {lat}, {lon} out of range"
            )));
        }
        Ok(())
    }

    pub fn configured_delay(&self, kind: super::action_kind::ActionKind) -> u32 {
        if kind.is_start() {
            self.delay_start_minutes
        } else {
            self.delay_stop_minutes
        }
    }
}
