//! Orbital propagation of mean elements to an instantaneous geodetic position.
//!
//! Elements are checked up front, propagated with SGP4 (WGS84 geopotential),
//! then rotated from the inertial TEME frame into the Earth-fixed frame at the
//! query time. Any failure is reported as [`PropagationError`]; callers drop
//! the satellite and carry on.

use chrono::{DateTime, Utc};
use std::f64::consts::PI;

use crate::entity::OrbitalElements;
use crate::error::PropagationError;
use crate::geo::{teme_to_geodetic, GeodeticPosition};

mod tle;
#[cfg(test)]
mod tests;

pub use tle::{parse_tle_catalog, TleParseOutcome};

const MINUTES_PER_DAY: f64 = 1440.0;

/// 2000-01-01T12:00:00Z in Unix milliseconds
const J2000_UNIX_MS: i64 = 946_728_000_000;

/// Computes latitude/longitude/altitude of a satellite at `at`.
///
/// Elements with an epoch far from `at` are extrapolated; accuracy degrades
/// but the call never panics.
pub fn propagate(
    elements: &OrbitalElements,
    at: DateTime<Utc>,
) -> Result<GeodeticPosition, PropagationError> {
    check_elements(elements)?;

    let orbit = sgp4::Orbit::from_kozai_elements(
        &sgp4::WGS84,
        elements.inclination_deg.to_radians(),
        elements.raan_deg.to_radians(),
        elements.eccentricity,
        elements.arg_perigee_deg.to_radians(),
        elements.mean_anomaly_deg.to_radians(),
        elements.mean_motion * (2.0 * PI / MINUTES_PER_DAY),
    )
    .map_err(|e| PropagationError::Rejected(e.to_string()))?;

    let constants = sgp4::Constants::new(
        sgp4::WGS84,
        sgp4::iau_epoch_to_sidereal_time,
        years_since_j2000(elements.epoch),
        elements.bstar,
        orbit,
    )
    .map_err(|e| PropagationError::Rejected(e.to_string()))?;

    let prediction = constants
        .propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch(elements, at)))
        .map_err(|e| PropagationError::Rejected(e.to_string()))?;

    if prediction.position.iter().any(|c| !c.is_finite()) {
        return Err(PropagationError::InvalidOutput);
    }

    let position = teme_to_geodetic(prediction.position, at);
    if !position.is_finite() {
        return Err(PropagationError::InvalidOutput);
    }
    Ok(position)
}

/// Minutes elapsed from the element epoch to `at` (negative before the epoch).
pub fn minutes_since_epoch(elements: &OrbitalElements, at: DateTime<Utc>) -> f64 {
    (at - elements.epoch).num_milliseconds() as f64 / 60_000.0
}

fn check_elements(elements: &OrbitalElements) -> Result<(), PropagationError> {
    let angles = [
        ("inclination", elements.inclination_deg),
        ("raan", elements.raan_deg),
        ("argument of perigee", elements.arg_perigee_deg),
        ("mean anomaly", elements.mean_anomaly_deg),
        ("bstar", elements.bstar),
    ];
    for (name, value) in angles {
        if !value.is_finite() {
            return Err(PropagationError::NonFinite(name));
        }
    }

    if !(0.0..1.0).contains(&elements.eccentricity) {
        return Err(PropagationError::Eccentricity(elements.eccentricity));
    }
    if !(elements.mean_motion.is_finite() && elements.mean_motion > 0.0) {
        return Err(PropagationError::MeanMotion(elements.mean_motion));
    }
    Ok(())
}

/// Epoch expressed the way the SGP4 sidereal-time model expects it.
fn years_since_j2000(epoch: DateTime<Utc>) -> f64 {
    (epoch.timestamp_millis() - J2000_UNIX_MS) as f64 / (365.25 * 86_400_000.0)
}
