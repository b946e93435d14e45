// Error taxonomy shared by the core and the feed adapters
pub mod error;

// Tracked entities and their validation rules
pub mod entity;

// Great-circle and Earth-frame helpers
pub mod geo;

// SGP4 propagation and TLE parsing
pub mod propagation;

// Immutable snapshots and the atomically swapped world store
pub mod world;

// Pairwise proximity alerting
pub mod proximity;

// TOML configuration
pub mod config;

// Dashboard HTTP and WebSocket APIs
pub mod api;

pub use entity::{AircraftInfo, Entity, EntityDetail, EntityKind, OrbitalElements};
pub use error::{FetchError, PropagationError, PublishError, ValidationError};
pub use proximity::{Alert, ProximityDetector};
pub use world::{Snapshot, SnapshotBuilder, WorldStore, WorldView};
