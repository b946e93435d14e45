use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::WorldView;
use crate::error::PublishError;

/// Holds the current [`WorldView`] and hands out shared references to it.
///
/// Publication swaps one `Arc` under a write lock held only for the swap, so a
/// reader sees either the old view or the new one, never a mix. Readers keep
/// their `Arc` for as long as they like; later publications do not affect it.
pub struct WorldStore {
    current: RwLock<Arc<WorldView>>,

    /// Broadcast channel for newly published views
    updates_tx: broadcast::Sender<Arc<WorldView>>,
}

impl WorldStore {
    /// Create a store holding the empty generation-0 view
    pub fn new() -> Self {
        let (updates_tx, _) = broadcast::channel(16);
        Self {
            current: RwLock::new(Arc::new(WorldView::empty())),
            updates_tx,
        }
    }

    /// The most recently published view.
    pub fn current(&self) -> Arc<WorldView> {
        // Views are replaced wholesale, so a poisoned lock still guards a complete value
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the current view.
    ///
    /// Generations must strictly increase; anything else is refused and the
    /// current view stays in place.
    pub fn publish(&self, view: WorldView) -> Result<Arc<WorldView>, PublishError> {
        let view = Arc::new(view);
        {
            let mut guard = self.current.write().map_err(|_| PublishError::Poisoned)?;
            let current = guard.generation();
            if view.generation() <= current {
                return Err(PublishError::StaleGeneration {
                    current,
                    attempted: view.generation(),
                });
            }
            *guard = Arc::clone(&view);
        }

        info!(
            generation = view.generation(),
            entities = view.snapshot.len(),
            alerts = view.alerts.len(),
            "World state published"
        );

        // No subscribers is fine
        if self.updates_tx.send(Arc::clone(&view)).is_err() {
            debug!("No world state subscribers");
        }

        Ok(view)
    }

    /// Subscribe to publications made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<WorldView>> {
        self.updates_tx.subscribe()
    }
}

impl Default for WorldStore {
    fn default() -> Self {
        Self::new()
    }
}
