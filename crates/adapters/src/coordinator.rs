// SPDX-License-Identifier: MIT

//! The leadership coordinator: a barrier the state machine waits on
//! during the elected-preparation sequence and signals on stop.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("coordinator prepare failed: {0}")]
    PrepareFailed(String),
}

#[async_trait]
pub trait LeadershipCoordinator: Send + Sync {
    /// Block until this replica's collaborators (actors, caches, ...) are
    /// ready to serve as leader. Called after `onElected` callbacks, before
    /// driver construction.
    async fn prepare_for_start(&self) -> Result<(), CoordinatorError>;

    /// Tear down whatever `prepare_for_start` set up. Called on defeat.
    async fn stop(&self);
}

/// In-process coordinator that signals readiness via a `Notify`, grounded
/// on an internal-event-channel forwarder task: preparation work runs in
/// the background and `prepare_for_start` simply waits for it to post.
pub struct NotifyCoordinator {
    ready: Arc<Notify>,
    stopped: Arc<Notify>,
    always_ready: AtomicBool,
}

impl NotifyCoordinator {
    pub fn new() -> Self {
        Self { ready: Arc::new(Notify::new()), stopped: Arc::new(Notify::new()), always_ready: AtomicBool::new(false) }
    }

    /// Handle used by whatever background task performs the actual
    /// preparation work, to signal completion.
    pub fn ready_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.ready)
    }

    /// Mark this coordinator ready on every epoch, for callers with no
    /// subsystem that needs to signal completion itself (tests, and the
    /// solo/dev wiring, which has nothing to wait on). A plain `notify_one`
    /// would only satisfy the first epoch's wait since the permit it stores
    /// is consumed by the first `notified().await`; subsequent epochs would
    /// then hang in `prepare_for_start`, so this is a standing flag instead.
    pub fn also_ready(self) -> Self {
        self.always_ready.store(true, Ordering::Release);
        self
    }
}

impl Default for NotifyCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadershipCoordinator for NotifyCoordinator {
    async fn prepare_for_start(&self) -> Result<(), CoordinatorError> {
        if self.always_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        self.ready.notified().await;
        Ok(())
    }

    async fn stop(&self) {
        self.stopped.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepare_unblocks_on_ready_signal() {
        let coordinator = Arc::new(NotifyCoordinator::new());
        let ready = coordinator.ready_handle();
        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.prepare_for_start().await })
        };
        ready.notify_one();
        waiter.await.unwrap().unwrap();
    }
}
