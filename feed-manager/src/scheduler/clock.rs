use chrono::{DateTime, Utc};

/// Wall-clock time source for refresh cycles.
///
/// Cycle time drives both satellite propagation and source cadence, so tests
/// substitute a clock they control.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
