// World state: immutable snapshots published as one unit with their alerts

mod snapshot;
mod store;

pub use snapshot::{Snapshot, SnapshotBuilder};
pub use store::WorldStore;

use crate::proximity::Alert;
use serde::Serialize;

#[cfg(test)]
mod tests;

/// What consumers read: a snapshot together with the alerts computed from it.
///
/// Published and replaced as a whole, so alerts always belong to the snapshot
/// next to them.
#[derive(Clone, Debug, Serialize)]
pub struct WorldView {
    pub snapshot: Snapshot,
    pub alerts: Vec<Alert>,
    pub report: CycleReport,
}

impl WorldView {
    pub fn empty() -> Self {
        Self {
            snapshot: Snapshot::empty(),
            alerts: Vec::new(),
            report: CycleReport::default(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.snapshot.generation()
    }
}

/// Per-cycle accounting of absorbed errors
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub sources: Vec<SourceReport>,
    /// Satellites excluded because their elements could not be propagated
    pub propagation_failures: usize,
    /// Entities refused by snapshot validation
    pub validation_drops: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub outcome: SourceOutcome,
    /// Raw records the source contributed to this cycle
    pub records: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// Contacted this cycle and answered
    Fetched,
    /// Not due yet; records from its last successful fetch were reused
    Cached,
    /// Contacted and failed (error, bad payload or timeout)
    Failed { error: String },
}
