//! Pairwise proximity detection over one snapshot.
//!
//! Entities are swept in latitude order: once the latitude gap alone exceeds
//! the largest horizontal threshold no later entity can be close enough, so
//! the inner loop stops. The result is identical to comparing every pair.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::entity::{Entity, EntityKind};
use crate::geo::{haversine_m, meridional_distance_m};
use crate::world::Snapshot;

mod config;

pub use config::{PairThreshold, ThresholdConfig};

/// Slack added to the sweep cut-off so rounding never skips a qualifying pair
const SWEEP_SLACK_M: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Which kinds of entity an alert relates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    AircraftAircraft,
    SatelliteSatellite,
    AircraftSatellite,
}

impl Pairing {
    pub const ALL: [Pairing; 3] = [
        Pairing::AircraftAircraft,
        Pairing::SatelliteSatellite,
        Pairing::AircraftSatellite,
    ];

    pub fn of(a: EntityKind, b: EntityKind) -> Self {
        match (a, b) {
            (EntityKind::Aircraft, EntityKind::Aircraft) => Pairing::AircraftAircraft,
            (EntityKind::Satellite, EntityKind::Satellite) => Pairing::SatelliteSatellite,
            _ => Pairing::AircraftSatellite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pairing::AircraftAircraft => "aircraft_aircraft",
            Pairing::SatelliteSatellite => "satellite_satellite",
            Pairing::AircraftSatellite => "aircraft_satellite",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Pairing::AircraftAircraft => "Potential collision between",
            Pairing::SatelliteSatellite => "Conjunction between",
            Pairing::AircraftSatellite => "Aircraft under satellite ground track:",
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    fn of(entity: &Entity) -> Self {
        Self {
            kind: entity.kind(),
            id: entity.id.clone(),
        }
    }
}

/// A pair of entities closer than their pairing's limits on both axes.
///
/// `first` sorts before `second` by (kind, id), so the same pair always
/// yields the same alert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub first: EntityRef,
    pub second: EntityRef,
    pub pairing: Pairing,
    pub severity: Severity,
    pub horizontal_m: f64,
    pub vertical_m: f64,
    /// Snapshot generation the alert was computed from
    pub generation: u64,
    pub message: String,
}

/// Stateless: the same snapshot always produces the same alerts.
#[derive(Clone, Debug)]
pub struct ProximityDetector {
    thresholds: ThresholdConfig,
}

impl ProximityDetector {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Evaluate every unordered pair in the snapshot.
    ///
    /// Entities with unknown altitude take part in no pairing, since every
    /// pairing needs a vertical comparison. Output is sorted by severity
    /// (highest first), then by the pair.
    pub fn detect(&self, snapshot: &Snapshot) -> Vec<Alert> {
        let mut candidates: Vec<(&Entity, f64)> = snapshot
            .entities()
            .iter()
            .filter_map(|e| e.altitude_m.map(|alt| (e, alt)))
            .collect();
        candidates.sort_by(|a, b| a.0.latitude.total_cmp(&b.0.latitude));

        let cutoff_m = self.thresholds.max_horizontal_m() + SWEEP_SLACK_M;
        let mut alerts = Vec::new();

        for (i, &(a, alt_a)) in candidates.iter().enumerate() {
            for &(b, alt_b) in &candidates[i + 1..] {
                if meridional_distance_m(a.latitude, b.latitude) > cutoff_m {
                    break;
                }
                if let Some(alert) = self.evaluate(a, alt_a, b, alt_b, snapshot.generation()) {
                    alerts.push(alert);
                }
            }
        }

        alerts.sort_by(compare_alerts);
        alerts
    }

    fn evaluate(
        &self,
        a: &Entity,
        alt_a: f64,
        b: &Entity,
        alt_b: f64,
        generation: u64,
    ) -> Option<Alert> {
        let pairing = Pairing::of(a.kind(), b.kind());
        let threshold = self.thresholds.for_pairing(pairing);

        let vertical_m = (alt_a - alt_b).abs();
        if vertical_m >= threshold.vertical_m {
            return None;
        }
        let horizontal_m = haversine_m(a.latitude, a.longitude, b.latitude, b.longitude);
        if horizontal_m >= threshold.horizontal_m {
            return None;
        }

        let (first, second) = if EntityRef::of(a) <= EntityRef::of(b) {
            (a, b)
        } else {
            (b, a)
        };

        Some(Alert {
            first: EntityRef::of(first),
            second: EntityRef::of(second),
            pairing,
            severity: threshold.severity,
            horizontal_m,
            vertical_m,
            generation,
            message: format!(
                "{} {} and {} (horizontal {:.0} m, vertical {:.0} m)",
                pairing.describe(),
                first.label(),
                second.label(),
                horizontal_m,
                vertical_m
            ),
        })
    }
}

fn compare_alerts(a: &Alert, b: &Alert) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.first.cmp(&b.first))
        .then_with(|| a.second.cmp(&b.second))
}
