use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A resolved location sample as delivered by the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timestamp_ms: i64,
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms,
            accuracy_meters: None,
        }
    }

    /// Reject coordinates that cannot be on Earth.
    pub fn validate(&self) -> AppResult<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::InvalidFix(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::InvalidFix(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Parse one NDJSON line.
    pub fn from_json_line(line: &str) -> AppResult<Self> {
        let fix: LocationFix = serde_json::from_str(line)?;
        fix.validate()?;
        Ok(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndjson_line_without_timestamp_parses() {
        let fix = LocationFix::from_json_line(r#"{"latitude":45.0,"longitude":9.0}"#).unwrap();
        assert_eq!(fix.timestamp_ms, 0);
        assert_eq!(fix.accuracy_meters, None);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(LocationFix::new(90.5, 0.0, 0).validate().is_err());
        assert!(LocationFix::new(0.0, -180.5, 0).validate().is_err());
        assert!(LocationFix::new(f64::NAN, 0.0, 0).validate().is_err());
        assert!(LocationFix::new(-90.0, 180.0, 0).validate().is_ok());
    }
}
