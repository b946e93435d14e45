use async_trait::async_trait;
use skyfuse::{Entity, EntityKind, FetchError, OrbitalElements};
use std::time::Duration;

/// One record delivered by a source, before snapshot assembly.
///
/// Aircraft arrive already positioned. Satellites arrive as elements and are
/// placed by the propagator at cycle time, so cached elements still move.
#[derive(Clone, Debug, PartialEq)]
pub enum RawRecord {
    Aircraft(Entity),
    Elements(OrbitalElements),
}

/// Position source interface for external feeds.
///
/// Sources are stateless across calls; the scheduler owns cadence, caching,
/// timeouts and failure accounting.
///
/// # Example
/// ```no_run
/// use async_trait::async_trait;
/// use feed_manager::{PositionSource, RawRecord};
/// use skyfuse::{EntityKind, FetchError};
/// use std::time::Duration;
///
/// struct Quiet;
///
/// #[async_trait]
/// impl PositionSource for Quiet {
///     fn name(&self) -> &str {
///         "quiet"
///     }
///
///     fn kind(&self) -> EntityKind {
///         EntityKind::Aircraft
///     }
///
///     fn poll_interval(&self) -> Duration {
///         Duration::ZERO
///     }
///
///     async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Unique identifier, used in logs, reports and the status API.
    fn name(&self) -> &str;

    /// Kind of entity this source produces.
    fn kind(&self) -> EntityKind;

    /// Minimum age of the last successful fetch before the source is
    /// contacted again. Zero means every cycle.
    fn poll_interval(&self) -> Duration;

    /// Fetch and normalize the source's current records.
    ///
    /// Records outside the source's area of interest are already filtered.
    /// Individual malformed records are dropped; an error means the source
    /// as a whole produced nothing usable.
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError>;
}
