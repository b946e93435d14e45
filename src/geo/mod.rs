//! Geodesy helpers: great-circle distance, sidereal time, and conversion of
//! Earth-centered positions into WGS84 latitude/longitude/altitude.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::normalize_longitude;

/// Mean Earth radius used for horizontal separation (meters)
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 equatorial radius (kilometers)
const WGS84_A_KM: f64 = 6378.137;

/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Julian date of the J2000 epoch (2000-01-01T12:00:00 UTC)
const J2000_JD: f64 = 2_451_545.0;

/// Julian date of the Unix epoch
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl GeodeticPosition {
    pub fn is_finite(&self) -> bool {
        self.latitude_deg.is_finite() && self.longitude_deg.is_finite() && self.altitude_m.is_finite()
    }
}

/// Great-circle distance in meters between two points given in degrees (haversine).
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_MEAN_RADIUS_M * c
}

/// Lower bound on the great-circle distance implied by the latitude difference alone.
pub fn meridional_distance_m(lat1: f64, lat2: f64) -> f64 {
    (lat2 - lat1).abs().to_radians() * EARTH_MEAN_RADIUS_M
}

/// Fractional Julian date of a UTC instant.
pub fn julian_date(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

/// Greenwich mean sidereal time in radians (IAU 1982 model, UT1 taken as UTC).
pub fn gmst_rad(at: DateTime<Utc>) -> f64 {
    let t = (julian_date(at) - J2000_JD) / 36_525.0;
    let seconds = 67_310.548_41 + (876_600.0 * 3600.0 + 8_640_184.812_866) * t
        + 0.093_104 * t * t
        - 6.2e-6 * t * t * t;
    (seconds / 240.0).rem_euclid(360.0).to_radians()
}

/// Converts an inertial (TEME) position in kilometers into geodetic coordinates,
/// rotating by Earth's sidereal angle at `at`.
pub fn teme_to_geodetic(position_km: [f64; 3], at: DateTime<Utc>) -> GeodeticPosition {
    let theta = gmst_rad(at);
    let (sin_t, cos_t) = theta.sin_cos();
    let [x, y, z] = position_km;

    // Earth-fixed frame: rotate about the polar axis by -theta
    let xe = cos_t * x + sin_t * y;
    let ye = -sin_t * x + cos_t * y;

    ecef_to_geodetic([xe, ye, z])
}

/// Earth-fixed Cartesian (kilometers) to WGS84 geodetic, by fixed-point iteration on latitude.
pub fn ecef_to_geodetic(position_km: [f64; 3]) -> GeodeticPosition {
    let [x, y, z] = position_km;
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let p = x.hypot(y);
    let longitude = y.atan2(x);

    let mut latitude = z.atan2(p * (1.0 - e2));
    let mut height_km = 0.0;
    for _ in 0..6 {
        let sin_lat = latitude.sin();
        let n = WGS84_A_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        height_km = if latitude.cos().abs() > 1e-10 {
            p / latitude.cos() - n
        } else {
            z.abs() - n * (1.0 - e2)
        };
        latitude = z.atan2(p * (1.0 - e2 * n / (n + height_km)));
    }

    GeodeticPosition {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: normalize_longitude(longitude.to_degrees()),
        altitude_m: height_km * 1000.0,
    }
}
