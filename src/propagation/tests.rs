use super::*;
use chrono::{Duration, TimeZone};

const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

/// Near-circular 51.6° orbit whose epoch is J2000, placed a quarter orbit past
/// the ascending node. At epoch the sub-satellite point is the orbit's
/// northernmost point, 90° of right ascension east of the node.
fn reference_elements() -> OrbitalElements {
    OrbitalElements {
        catalog_number: 90001,
        name: Some("REFERENCE".to_string()),
        epoch: Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap(),
        mean_motion: 15.5,
        eccentricity: 0.0001,
        inclination_deg: 51.6,
        raan_deg: 0.0,
        arg_perigee_deg: 0.0,
        mean_anomaly_deg: 90.0,
        bstar: 0.0,
    }
}

#[test]
fn test_propagate_at_epoch_matches_reference_position() {
    let elements = reference_elements();
    let position = propagate(&elements, elements.epoch).unwrap();

    // Geodetic latitude sits slightly poleward of the 51.6° geocentric value
    assert!(
        (position.latitude_deg - 51.78).abs() < 0.5,
        "latitude {}",
        position.latitude_deg
    );
    // Right ascension 90°, minus GMST at J2000 (280.46°), wrapped
    assert!(
        (position.longitude_deg - 169.54).abs() < 0.5,
        "longitude {}",
        position.longitude_deg
    );
    // Semi-major axis for 15.5 rev/day is ~6795 km
    assert!(
        (position.altitude_m - 430_000.0).abs() < 30_000.0,
        "altitude {}",
        position.altitude_m
    );
}

#[test]
fn test_propagate_moves_with_time() {
    let elements = reference_elements();
    let start = propagate(&elements, elements.epoch).unwrap();
    let later = propagate(&elements, elements.epoch + Duration::minutes(10)).unwrap();

    assert!(later.latitude_deg < start.latitude_deg);
    assert!(later.longitude_deg != start.longitude_deg);
}

#[test]
fn test_eccentricity_out_of_range_rejected() {
    let mut elements = reference_elements();
    elements.eccentricity = 1.5;
    assert_eq!(
        propagate(&elements, elements.epoch),
        Err(PropagationError::Eccentricity(1.5))
    );

    elements.eccentricity = -0.1;
    assert!(matches!(
        propagate(&elements, elements.epoch),
        Err(PropagationError::Eccentricity(_))
    ));
}

#[test]
fn test_non_positive_mean_motion_rejected() {
    let mut elements = reference_elements();
    elements.mean_motion = 0.0;
    assert_eq!(
        propagate(&elements, elements.epoch),
        Err(PropagationError::MeanMotion(0.0))
    );

    elements.mean_motion = f64::NAN;
    assert!(matches!(
        propagate(&elements, elements.epoch),
        Err(PropagationError::MeanMotion(_))
    ));
}

#[test]
fn test_non_finite_angle_rejected() {
    let mut elements = reference_elements();
    elements.inclination_deg = f64::INFINITY;
    assert_eq!(
        propagate(&elements, elements.epoch),
        Err(PropagationError::NonFinite("inclination"))
    );
}

#[test]
fn test_far_from_epoch_never_panics() {
    let mut elements = reference_elements();
    elements.bstar = 0.0001;

    for days in [-3650, -30, 30, 3650] {
        let at = elements.epoch + Duration::days(days);
        if let Ok(position) = propagate(&elements, at) {
            assert!((-90.0..=90.0).contains(&position.latitude_deg));
            assert!((-180.0..=180.0).contains(&position.longitude_deg));
        }
    }
}

#[test]
fn test_minutes_since_epoch() {
    let elements = reference_elements();
    assert_eq!(minutes_since_epoch(&elements, elements.epoch), 0.0);
    assert_eq!(
        minutes_since_epoch(&elements, elements.epoch + Duration::hours(2)),
        120.0
    );
    assert_eq!(
        minutes_since_epoch(&elements, elements.epoch - Duration::seconds(90)),
        -1.5
    );
}

#[test]
fn test_parse_three_line_catalog() {
    let outcome = parse_tle_catalog(ISS_TLE);

    assert!(outcome.rejected.is_empty(), "{:?}", outcome.rejected);
    assert_eq!(outcome.elements.len(), 1);

    let iss = &outcome.elements[0];
    assert_eq!(iss.catalog_number, 25544);
    assert_eq!(iss.name.as_deref(), Some("ISS (ZARYA)"));
    assert!((iss.inclination_deg - 51.6461).abs() < 1e-9);
    assert!((iss.raan_deg - 221.2784).abs() < 1e-9);
    assert!((iss.eccentricity - 0.0001413).abs() < 1e-12);
    assert!((iss.mean_motion - 15.495_078_96).abs() < 1e-6);
    assert_eq!(iss.epoch.date_naive(), chrono::NaiveDate::from_ymd_opt(2020, 7, 12).unwrap());
}

#[test]
fn test_parse_two_line_catalog_without_name() {
    let two_line: String = ISS_TLE.lines().skip(1).collect::<Vec<_>>().join("\n");
    let outcome = parse_tle_catalog(&two_line);

    assert_eq!(outcome.elements.len(), 1);
    assert_eq!(outcome.elements[0].name, None);
}

#[test]
fn test_corrupt_record_dropped_others_kept() {
    let text = format!(
        "BROKEN\n1 99999U 98067A   20194.88612269\n2 99999  51.6461\n{}",
        ISS_TLE
    );
    let outcome = parse_tle_catalog(&text);

    assert_eq!(outcome.elements.len(), 1);
    assert_eq!(outcome.elements[0].catalog_number, 25544);
    assert_eq!(outcome.rejected.len(), 1);
}

#[test]
fn test_stray_lines_reported() {
    let outcome = parse_tle_catalog("No GP data found\n");
    assert!(outcome.elements.is_empty());
    assert_eq!(outcome.rejected.len(), 1);
}

#[test]
fn test_parsed_iss_propagates_to_low_earth_orbit() {
    let outcome = parse_tle_catalog(ISS_TLE);
    let iss = &outcome.elements[0];

    let position = propagate(iss, iss.epoch + Duration::minutes(30)).unwrap();
    assert!(position.latitude_deg.abs() <= 52.5);
    assert!(
        (350_000.0..460_000.0).contains(&position.altitude_m),
        "altitude {}",
        position.altitude_m
    );
}
