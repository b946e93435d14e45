use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geo::GeodeticPosition;

mod validation;
#[cfg(test)]
mod tests;

pub use validation::{normalize_longitude, validate_entity, ValidationError};

/// Kind tag of a tracked object.
///
/// Ordering is used for canonical pair ordering in alerts (aircraft first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Aircraft,
    Satellite,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Aircraft => "aircraft",
            EntityKind::Satellite => "satellite",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aircraft" | "plane" => Ok(EntityKind::Aircraft),
            "satellite" => Ok(EntityKind::Satellite),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

/// A tracked object as stored in a snapshot.
///
/// Position fields are common to every kind; kind-specific data lives in
/// `detail`, which also carries the `kind` tag when serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier, unique per kind within a snapshot
    /// (ICAO 24-bit address for aircraft, catalog number for satellites)
    pub id: String,

    /// Degrees, [-90, 90]
    pub latitude: f64,

    /// Degrees, [-180, 180]
    pub longitude: f64,

    /// Meters above sea level; `None` when the source does not know it
    pub altitude_m: Option<f64>,

    /// Time of the observation (aircraft) or propagation (satellites)
    pub observed_at: DateTime<Utc>,

    #[serde(flatten)]
    pub detail: EntityDetail,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityDetail {
    Aircraft(AircraftInfo),
    Satellite(SatelliteInfo),
}

/// ADS-B state that has no bearing on position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftInfo {
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    /// Meters per second over ground
    pub ground_speed_mps: Option<f64>,
    /// True track, degrees clockwise from north
    pub heading_deg: Option<f64>,
    /// Meters per second, positive when climbing
    pub vertical_rate_mps: Option<f64>,
    pub on_ground: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SatelliteInfo {
    pub name: Option<String>,
    pub elements: OrbitalElements,
}

/// Mean orbital elements of one satellite at a reference epoch (TLE semantics).
///
/// Angles are in degrees, mean motion in revolutions per day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub catalog_number: u64,
    pub name: Option<String>,
    pub epoch: DateTime<Utc>,
    pub mean_motion: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// B* drag term, inverse Earth radii
    pub bstar: f64,
}

impl Entity {
    pub fn aircraft(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        altitude_m: Option<f64>,
        observed_at: DateTime<Utc>,
        info: AircraftInfo,
    ) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            altitude_m,
            observed_at,
            detail: EntityDetail::Aircraft(info),
        }
    }

    /// Satellite entity placed at a propagated position.
    pub fn satellite(
        elements: OrbitalElements,
        position: GeodeticPosition,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: elements.catalog_number.to_string(),
            latitude: position.latitude_deg,
            longitude: position.longitude_deg,
            altitude_m: Some(position.altitude_m),
            observed_at: at,
            detail: EntityDetail::Satellite(SatelliteInfo {
                name: elements.name.clone(),
                elements,
            }),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.detail {
            EntityDetail::Aircraft(_) => EntityKind::Aircraft,
            EntityDetail::Satellite(_) => EntityKind::Satellite,
        }
    }

    /// Human-facing label: callsign or satellite name when known, else the id.
    pub fn label(&self) -> &str {
        let named = match &self.detail {
            EntityDetail::Aircraft(info) => info.callsign.as_deref(),
            EntityDetail::Satellite(info) => info.name.as_deref(),
        };
        named.filter(|n| !n.is_empty()).unwrap_or(&self.id)
    }
}
