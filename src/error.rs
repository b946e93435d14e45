use std::time::Duration;
use thiserror::Error;

pub use crate::entity::ValidationError;

/// Failure of a position source to deliver records for one cycle.
///
/// Always recoverable: the source contributes nothing to that cycle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("source did not respond within {limit:?}")]
    Timeout { limit: Duration },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("source returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Orbital elements that cannot be turned into a position.
///
/// The affected satellite is excluded from the snapshot.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PropagationError {
    #[error("eccentricity {0} outside [0, 1)")]
    Eccentricity(f64),

    #[error("mean motion {0} rev/day must be positive")]
    MeanMotion(f64),

    #[error("non-finite orbital element: {0}")]
    NonFinite(&'static str),

    #[error("propagator rejected elements: {0}")]
    Rejected(String),

    #[error("propagation produced a non-finite position")]
    InvalidOutput,
}

/// A snapshot could not be published. Fatal for the current cycle only.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PublishError {
    #[error("generation {attempted} is not newer than published generation {current}")]
    StaleGeneration { current: u64, attempted: u64 },

    #[error("world store lock poisoned")]
    Poisoned,
}
