use super::*;
use chrono::TimeZone;
use serde_json::json;

fn plane(id: &str, lat: f64, lon: f64) -> Entity {
    Entity::aircraft(
        id,
        lat,
        lon,
        Some(1000.0),
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        AircraftInfo::default(),
    )
}

fn elements() -> OrbitalElements {
    OrbitalElements {
        catalog_number: 25544,
        name: Some("ISS (ZARYA)".to_string()),
        epoch: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        mean_motion: 15.5,
        eccentricity: 0.0004,
        inclination_deg: 51.64,
        raan_deg: 200.0,
        arg_perigee_deg: 90.0,
        mean_anomaly_deg: 270.0,
        bstar: 0.0001,
    }
}

#[test]
fn test_valid_entity_passes() {
    assert!(validate_entity(&plane("a1b2c3", 28.14, 77.32)).is_ok());
    assert!(validate_entity(&plane("edge", 90.0, -180.0)).is_ok());
    assert!(validate_entity(&plane("edge", -90.0, 180.0)).is_ok());
}

#[test]
fn test_out_of_range_coordinates_rejected() {
    assert!(matches!(
        validate_entity(&plane("x", 90.5, 0.0)),
        Err(ValidationError::LatitudeOutOfRange { .. })
    ));
    assert!(matches!(
        validate_entity(&plane("x", 0.0, -180.01)),
        Err(ValidationError::LongitudeOutOfRange { .. })
    ));
}

#[test]
fn test_nan_coordinates_rejected() {
    assert!(validate_entity(&plane("x", f64::NAN, 0.0)).is_err());
    assert!(validate_entity(&plane("x", 0.0, f64::NAN)).is_err());
}

#[test]
fn test_empty_id_rejected() {
    assert_eq!(
        validate_entity(&plane("  ", 0.0, 0.0)),
        Err(ValidationError::EmptyId)
    );
}

#[test]
fn test_non_finite_altitude_rejected() {
    let mut entity = plane("x", 0.0, 0.0);
    entity.altitude_m = Some(f64::INFINITY);
    assert!(matches!(
        validate_entity(&entity),
        Err(ValidationError::NonFiniteAltitude { .. })
    ));

    entity.altitude_m = None;
    assert!(validate_entity(&entity).is_ok());
}

#[test]
fn test_normalize_longitude() {
    assert_eq!(normalize_longitude(190.0), -170.0);
    assert_eq!(normalize_longitude(-190.0), 170.0);
    assert_eq!(normalize_longitude(540.0), -180.0);
    assert!((normalize_longitude(77.32) - 77.32).abs() < 1e-9);
    assert!(normalize_longitude(f64::NAN).is_nan());
}

#[test]
fn test_kind_and_label() {
    let mut entity = plane("a1b2c3", 0.0, 0.0);
    assert_eq!(entity.kind(), EntityKind::Aircraft);
    assert_eq!(entity.label(), "a1b2c3");

    entity.detail = EntityDetail::Aircraft(AircraftInfo {
        callsign: Some("AIC101".to_string()),
        ..Default::default()
    });
    assert_eq!(entity.label(), "AIC101");
}

#[test]
fn test_satellite_entity_uses_catalog_number() {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 1, 0, 0).unwrap();
    let position = GeodeticPosition {
        latitude_deg: 10.0,
        longitude_deg: 20.0,
        altitude_m: 420_000.0,
    };
    let entity = Entity::satellite(elements(), position, at);

    assert_eq!(entity.id, "25544");
    assert_eq!(entity.kind(), EntityKind::Satellite);
    assert_eq!(entity.altitude_m, Some(420_000.0));
    assert_eq!(entity.observed_at, at);
    assert_eq!(entity.label(), "ISS (ZARYA)");
}

#[test]
fn test_serialized_shape_carries_kind_tag() {
    let value = serde_json::to_value(plane("a1b2c3", 28.14, 77.32)).unwrap();

    assert_eq!(value["kind"], json!("aircraft"));
    assert_eq!(value["id"], json!("a1b2c3"));
    assert_eq!(value["altitude_m"], json!(1000.0));
    assert_eq!(value["on_ground"], json!(false));

    let back: Entity = serde_json::from_value(value).unwrap();
    assert_eq!(back.kind(), EntityKind::Aircraft);
}

#[test]
fn test_kind_from_str() {
    assert_eq!("aircraft".parse::<EntityKind>(), Ok(EntityKind::Aircraft));
    assert_eq!("plane".parse::<EntityKind>(), Ok(EntityKind::Aircraft));
    assert_eq!("satellite".parse::<EntityKind>(), Ok(EntityKind::Satellite));
    assert!("camera".parse::<EntityKind>().is_err());
}
