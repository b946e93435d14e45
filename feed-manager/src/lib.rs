//! Skyfuse feed manager - position sources and the refresh loop.
//!
//! Polls external position feeds on their own cadences, propagates satellite
//! elements to the cycle time, runs proximity detection and publishes the
//! result to a [`skyfuse::WorldStore`].
//!
//! # Architecture
//!
//! ```text
//! OpenSky (ADS-B)      CelesTrak (TLE)
//!        ↓                    ↓
//! ┌─────────────────────────────────────────┐
//! │   PositionSource (one per feed)          │
//! │  - Fetch and normalize raw records       │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │   RefreshScheduler                       │
//! │  - Concurrent fetch with timeouts        │
//! │  - Propagate elements, build snapshot    │
//! │  - Detect proximity, publish             │
//! └─────────────────────────────────────────┘
//!          ↓
//!      WorldStore → dashboard API
//! ```
//!
//! # Core Types
//!
//! - [`PositionSource`] - Trait every feed adapter implements
//! - [`RawRecord`] - Positioned aircraft or satellite elements
//! - [`RefreshScheduler`] - Cycle driver with start/stop lifecycle

mod source;
pub mod api;
pub mod registry;
pub mod scheduler;
pub mod sources;

pub use registry::build_sources;
pub use scheduler::{
    Clock, CycleState, RefreshScheduler, SchedulerConfig, SchedulerHandle, SchedulerStatus,
    SourceStatus, SystemClock,
};
pub use source::{PositionSource, RawRecord};
