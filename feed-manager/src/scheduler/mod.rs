//! Refresh scheduler.
//!
//! One task drives the whole refresh cycle:
//! `Idle → Fetching → Propagating → Detecting → Published`, then waiting for
//! the next tick. Sources are fetched concurrently, each in its own task under
//! its own timeout; a cycle always runs to completion before the next one
//! starts.

mod clock;

pub use clock::{Clock, SystemClock};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::{Stream, StreamExt};
use serde::Serialize;
use skyfuse::config::RefreshConfig;
use skyfuse::propagation::propagate;
use skyfuse::world::{CycleReport, SourceOutcome, SourceReport};
use skyfuse::{
    Entity, EntityKind, FetchError, ProximityDetector, PublishError, SnapshotBuilder, WorldStore,
    WorldView,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

use crate::{PositionSource, RawRecord};

/// Cycle timing and failure policy
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub source_timeout: Duration,
    pub carry_forward_on_failure: bool,
}

impl From<&RefreshConfig> for SchedulerConfig {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_seconds),
            source_timeout: Duration::from_secs(config.source_timeout_seconds),
            carry_forward_on_failure: config.carry_forward_on_failure,
        }
    }
}

/// Position of the scheduler in its cycle.
///
/// `Published` holds between a successful cycle and the next tick; `Idle`
/// means no cycle has published yet or the last one failed to publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Fetching,
    Propagating,
    Detecting,
    Published,
}

/// Poll statistics for one source.
#[derive(Clone, Debug, Serialize)]
pub struct SourceStatus {
    pub name: String,
    /// Last successful fetch
    pub last_poll: Option<DateTime<Utc>>,
    /// Error of the most recent fetch, cleared on success
    pub last_error: Option<String>,
    pub poll_count: u64,
    pub error_count: u64,
}

impl SourceStatus {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            last_poll: None,
            last_error: None,
            poll_count: 0,
            error_count: 0,
        }
    }
}

/// Status of the refresh loop for external monitoring.
#[derive(Clone, Debug, Serialize)]
pub struct SchedulerStatus {
    pub state: CycleState,
    /// Cycles that published
    pub cycle_count: u64,
    /// Cycles that could not publish
    pub failed_cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_generation: u64,
    pub last_error: Option<String>,
    pub sources: Vec<SourceStatus>,
}

/// A source plus what the scheduler remembers about it between cycles
struct SourceSlot {
    source: Arc<dyn PositionSource>,
    last_success: Option<DateTime<Utc>>,
    cached: Vec<RawRecord>,
}

impl SourceSlot {
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_success {
            None => true,
            Some(last) => {
                // A clock that went backwards counts as no time elapsed
                let age = (now - last).to_std().unwrap_or(Duration::ZERO);
                age >= self.source.poll_interval()
            }
        }
    }
}

/// Drives refresh cycles and publishes each result to the [`WorldStore`].
///
/// Owns the per-source cadence cache; the world store is the only state it
/// shares with readers.
pub struct RefreshScheduler {
    slots: Vec<SourceSlot>,
    store: Arc<WorldStore>,
    detector: ProximityDetector,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    status: Arc<Mutex<SchedulerStatus>>,
}

impl RefreshScheduler {
    pub fn new(
        sources: Vec<Arc<dyn PositionSource>>,
        store: Arc<WorldStore>,
        detector: ProximityDetector,
        config: SchedulerConfig,
    ) -> Self {
        Self::with_clock(sources, store, detector, config, Arc::new(SystemClock))
    }

    /// Create a scheduler reading cycle time from `clock`.
    pub fn with_clock(
        sources: Vec<Arc<dyn PositionSource>>,
        store: Arc<WorldStore>,
        detector: ProximityDetector,
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let status = SchedulerStatus {
            state: CycleState::Idle,
            cycle_count: 0,
            failed_cycles: 0,
            last_cycle_at: None,
            last_generation: store.current().generation(),
            last_error: None,
            sources: sources.iter().map(|s| SourceStatus::new(s.name())).collect(),
        };
        let slots = sources
            .into_iter()
            .map(|source| SourceSlot {
                source,
                last_success: None,
                cached: Vec::new(),
            })
            .collect();

        Self {
            slots,
            store,
            detector,
            clock,
            config,
            status: Arc::new(Mutex::new(status)),
        }
    }

    /// Returns a clone of the status tracker for external monitoring.
    pub fn status(&self) -> Arc<Mutex<SchedulerStatus>> {
        Arc::clone(&self.status)
    }

    async fn set_state(&self, state: CycleState) {
        self.status.lock().await.state = state;
    }

    /// Run one complete cycle and publish its result.
    ///
    /// Source and propagation failures are absorbed into the cycle report.
    /// Only a failed publication is returned as an error; the store keeps its
    /// previous view in that case. Adapter panics are reported as that
    /// source's fetch failure.
    pub async fn run_cycle(&mut self) -> Result<Arc<WorldView>, PublishError> {
        let started = Instant::now();
        let now = self.clock.now();
        let generation = self.store.current().generation() + 1;

        self.set_state(CycleState::Fetching).await;
        let (records, mut report) = self.fetch_sources(now).await;

        self.set_state(CycleState::Propagating).await;
        let mut builder = SnapshotBuilder::new(generation, now);
        for record in records {
            let entity = match record {
                RawRecord::Aircraft(entity) => entity,
                RawRecord::Elements(elements) => match propagate(&elements, now) {
                    Ok(position) => Entity::satellite(elements, position, now),
                    Err(e) => {
                        warn!(
                            catalog_number = elements.catalog_number,
                            error = %e,
                            "Satellite excluded: propagation failed"
                        );
                        report.propagation_failures += 1;
                        continue;
                    }
                },
            };
            if let Err(e) = builder.push(entity) {
                debug!(error = %e, "Entity dropped by validation");
            }
        }
        report.validation_drops = builder.dropped();

        self.set_state(CycleState::Detecting).await;
        let snapshot = builder.build();
        let alerts = self.detector.detect(&snapshot);
        let aircraft = snapshot.count(EntityKind::Aircraft);
        let satellites = snapshot.count(EntityKind::Satellite);

        let result = self.store.publish(WorldView {
            snapshot,
            alerts,
            report,
        });

        let mut status = self.status.lock().await;
        match &result {
            Ok(view) => {
                status.state = CycleState::Published;
                status.cycle_count += 1;
                status.last_cycle_at = Some(now);
                status.last_generation = view.generation();
                status.last_error = None;
                info!(
                    generation = view.generation(),
                    aircraft = aircraft,
                    satellites = satellites,
                    alerts = view.alerts.len(),
                    propagation_failures = view.report.propagation_failures,
                    validation_drops = view.report.validation_drops,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Refresh cycle published"
                );
            }
            Err(e) => {
                status.state = CycleState::Idle;
                status.failed_cycles += 1;
                status.last_error = Some(e.to_string());
                error!(generation = generation, error = %e, "Refresh cycle failed to publish");
            }
        }

        result
    }

    /// Fetch every due source concurrently; reuse cached records for the rest.
    async fn fetch_sources(&mut self, now: DateTime<Utc>) -> (Vec<RawRecord>, CycleReport) {
        let limit = self.config.source_timeout;
        let fetches = self.slots.iter().map(|slot| {
            let source = Arc::clone(&slot.source);
            let due = slot.is_due(now);
            async move {
                if !due {
                    return None;
                }
                // Own task per fetch so a panicking adapter only fails itself
                let task = tokio::spawn(async move { timeout(limit, source.fetch()).await });
                let result = match task.await {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => Err(FetchError::Timeout { limit }),
                    Err(e) => Err(FetchError::Transport(format!("source task failed: {}", e))),
                };
                Some(result)
            }
        });
        let results = join_all(fetches).await;

        let mut records = Vec::new();
        let mut report = CycleReport::default();
        let mut status = self.status.lock().await;

        for (index, (slot, result)) in self.slots.iter_mut().zip(results).enumerate() {
            let name = slot.source.name().to_string();
            let source_status = &mut status.sources[index];

            let (outcome, contributed) = match result {
                None => {
                    debug!(source = %name, "Source not due, reusing cached records");
                    (SourceOutcome::Cached, slot.cached.clone())
                }
                Some(Ok(fetched)) => {
                    slot.cached = fetched.clone();
                    slot.last_success = Some(now);
                    source_status.last_poll = Some(now);
                    source_status.last_error = None;
                    source_status.poll_count += 1;
                    debug!(source = %name, records = fetched.len(), "Source fetched");
                    (SourceOutcome::Fetched, fetched)
                }
                Some(Err(e)) => {
                    warn!(source = %name, error = %e, "Source fetch failed");
                    source_status.last_error = Some(e.to_string());
                    source_status.error_count += 1;

                    let carried = if self.config.carry_forward_on_failure {
                        slot.cached.clone()
                    } else {
                        Vec::new()
                    };
                    (
                        SourceOutcome::Failed {
                            error: e.to_string(),
                        },
                        carried,
                    )
                }
            };

            report.sources.push(SourceReport {
                source: name,
                outcome,
                records: contributed.len(),
            });
            records.extend(contributed);
        }

        (records, report)
    }

    /// Run cycles on a fixed interval, starting immediately.
    ///
    /// Ticks that elapse while a cycle is still running are skipped, so cycles
    /// never overlap or queue up.
    pub fn start(self) -> SchedulerHandle {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            interval_secs = self.config.interval.as_secs(),
            sources = self.slots.len(),
            "Starting refresh scheduler"
        );
        self.start_with_trigger(IntervalStream::new(ticker))
    }

    /// Run one cycle per item of `trigger` until it ends or the handle stops.
    pub fn start_with_trigger<S>(mut self, mut trigger: S) -> SchedulerHandle
    where
        S: Stream + Send + Unpin + 'static,
        S::Item: Send,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let status = self.status();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!("Refresh scheduler stop requested");
                        break;
                    }
                    tick = trigger.next() => {
                        if tick.is_none() {
                            debug!("Refresh trigger ended");
                            break;
                        }
                        // Failures are recorded in status; the next tick retries
                        let _ = self.run_cycle().await;
                    }
                }
            }
            info!("Refresh scheduler stopped");
        });

        SchedulerHandle {
            stop_tx: Some(stop_tx),
            task,
            status,
        }
    }
}

/// Running scheduler task.
pub struct SchedulerHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    status: Arc<Mutex<SchedulerStatus>>,
}

impl SchedulerHandle {
    pub fn status(&self) -> Arc<Mutex<SchedulerStatus>> {
        Arc::clone(&self.status)
    }

    /// Stop after the cycle in progress (if any) and wait for the task.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // Task may already have ended with its trigger
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            error!(error = %e, "Refresh scheduler task failed");
        }
    }
}
