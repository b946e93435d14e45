use serde::{Deserialize, Serialize};

use super::{Pairing, Severity};

/// Separation limits for one pairing. An alert needs both to be violated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairThreshold {
    /// Alert when great-circle separation is below this (meters)
    pub horizontal_m: f64,
    /// Alert when altitude difference is below this (meters)
    pub vertical_m: f64,
    pub severity: Severity,
}

/// Per-pairing proximity thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_aircraft_aircraft")]
    pub aircraft_aircraft: PairThreshold,
    #[serde(default = "default_satellite_satellite")]
    pub satellite_satellite: PairThreshold,
    #[serde(default = "default_aircraft_satellite")]
    pub aircraft_satellite: PairThreshold,
}

fn default_aircraft_aircraft() -> PairThreshold {
    PairThreshold {
        horizontal_m: 10_000.0,
        vertical_m: 1_000.0, // about 3000 ft
        severity: Severity::Critical,
    }
}

fn default_satellite_satellite() -> PairThreshold {
    PairThreshold {
        horizontal_m: 100_000.0,
        vertical_m: 10_000.0,
        severity: Severity::Warning,
    }
}

// Ground-track proximity: the vertical limit spans low Earth orbit
fn default_aircraft_satellite() -> PairThreshold {
    PairThreshold {
        horizontal_m: 50_000.0,
        vertical_m: 2_000_000.0,
        severity: Severity::Info,
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            aircraft_aircraft: default_aircraft_aircraft(),
            satellite_satellite: default_satellite_satellite(),
            aircraft_satellite: default_aircraft_satellite(),
        }
    }
}

impl ThresholdConfig {
    pub fn for_pairing(&self, pairing: Pairing) -> &PairThreshold {
        match pairing {
            Pairing::AircraftAircraft => &self.aircraft_aircraft,
            Pairing::SatelliteSatellite => &self.satellite_satellite,
            Pairing::AircraftSatellite => &self.aircraft_satellite,
        }
    }

    /// Largest horizontal threshold across pairings
    pub fn max_horizontal_m(&self) -> f64 {
        self.aircraft_aircraft
            .horizontal_m
            .max(self.satellite_satellite.horizontal_m)
            .max(self.aircraft_satellite.horizontal_m)
    }

    /// Every threshold must be a positive finite distance.
    pub fn validate(&self) -> Result<(), String> {
        for pairing in Pairing::ALL {
            let t = self.for_pairing(pairing);
            for (axis, value) in [("horizontal_m", t.horizontal_m), ("vertical_m", t.vertical_m)] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(format!(
                        "thresholds.{}.{} must be a positive distance, got {}",
                        pairing, axis, value
                    ));
                }
            }
        }
        Ok(())
    }
}
