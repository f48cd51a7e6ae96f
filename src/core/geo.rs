//! Great-circle distance and inside/outside classification.

use crate::models::{
    fix::LocationFix, job::JobGeofence, runtime_state::GeofenceRuntimeState,
};

/// Mean Earth radius used by the haversine formula, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Result of classifying one fix against one job's site.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub job_id: String,
    pub distance_meters: f64,
    pub is_inside_now: bool,
    pub previous_is_inside: bool,
}

impl Evaluation {
    pub fn is_transition(&self) -> bool {
        self.is_inside_now != self.previous_is_inside
    }
}

/// Haversine distance between two WGS-84 points, in metres.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Classify `fix` against `job`.
///
/// Returns `None` for a job without site coordinates: such a job never
/// produces a transition. The boundary is inclusive.
pub fn evaluate(
    job: &JobGeofence,
    fix: &LocationFix,
    previous: Option<&GeofenceRuntimeState>,
) -> Option<Evaluation> {
    let (lat, lon) = job.site()?;
    let distance = haversine_meters(fix.latitude, fix.longitude, lat, lon);

    Some(Evaluation {
        job_id: job.job_id.clone(),
        distance_meters: distance,
        is_inside_now: distance <= job.radius_meters,
        previous_is_inside: previous.map(|s| s.is_inside).unwrap_or(false),
    })
}
