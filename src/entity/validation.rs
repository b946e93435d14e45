use super::{Entity, EntityKind};
use thiserror::Error;

/// Reasons a normalized entity is refused by a snapshot
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("entity id is empty")]
    EmptyId,

    #[error("{id}: latitude {value} outside [-90, 90]")]
    LatitudeOutOfRange { id: String, value: f64 },

    #[error("{id}: longitude {value} outside [-180, 180]")]
    LongitudeOutOfRange { id: String, value: f64 },

    #[error("{id}: altitude is not finite")]
    NonFiniteAltitude { id: String },

    #[error("duplicate {kind} id '{id}', keeping first record")]
    DuplicateId { kind: EntityKind, id: String },
}

/// Checks the per-entity invariants of a snapshot.
///
/// Validation rules:
/// - Identifier: non-empty
/// - Latitude: finite, within [-90, 90]
/// - Longitude: finite, within [-180, 180]
/// - Altitude: finite when known
///
/// Uniqueness is checked by the snapshot builder, which sees all entities.
pub fn validate_entity(entity: &Entity) -> Result<(), ValidationError> {
    if entity.id.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }

    // NaN fails both comparisons, so the range checks also reject it
    if !(-90.0..=90.0).contains(&entity.latitude) {
        return Err(ValidationError::LatitudeOutOfRange {
            id: entity.id.clone(),
            value: entity.latitude,
        });
    }
    if !(-180.0..=180.0).contains(&entity.longitude) {
        return Err(ValidationError::LongitudeOutOfRange {
            id: entity.id.clone(),
            value: entity.longitude,
        });
    }

    if let Some(alt) = entity.altitude_m {
        if !alt.is_finite() {
            return Err(ValidationError::NonFiniteAltitude {
                id: entity.id.clone(),
            });
        }
    }

    Ok(())
}

/// Wraps a longitude in degrees into [-180, 180).
///
/// Non-finite input is returned unchanged so validation can reject it.
pub fn normalize_longitude(longitude: f64) -> f64 {
    if !longitude.is_finite() {
        return longitude;
    }
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}
