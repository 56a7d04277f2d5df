// SPDX-License-Identifier: MIT

//! Scriptable fake candidate for leader-lifecycle tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`. Unlike
//! [`crate::SoloCandidate`], which self-elects immediately with a no-op
//! hook, `FakeCandidate` holds on to the registered listener and lets a
//! test drive `elect()`/`defeat()` on demand with a real, countable hook —
//! the only way to exercise hook-exclusivity and defeat ordering outside a
//! live Kubernetes cluster.

use crate::candidate::{Candidate, CoordinationError, LeadershipListener};
use crate::hook::{AbdicationHook, HookAction};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

struct CountingHookAction(Arc<AtomicUsize>);

#[async_trait]
impl HookAction for CountingHookAction {
    async fn run(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A candidate a test can elect and defeat by hand.
///
/// `offer_leadership` only records the listener; nothing happens until the
/// test calls [`FakeCandidate::elect`] or [`FakeCandidate::defeat`].
pub struct FakeCandidate {
    listener: Mutex<Option<Arc<dyn LeadershipListener>>>,
    offer_count: Arc<AtomicUsize>,
    hook_runs: Arc<AtomicUsize>,
}

impl FakeCandidate {
    pub fn new() -> Self {
        Self {
            listener: Mutex::new(None),
            offer_count: Arc::new(AtomicUsize::new(0)),
            hook_runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many times `offer_leadership` has been called, i.e. how many
    /// times the state machine has re-entered the offering state.
    pub fn offer_count(&self) -> usize {
        self.offer_count.load(Ordering::SeqCst)
    }

    /// How many times any hook this candidate handed out has actually run.
    pub fn hook_run_count(&self) -> usize {
        self.hook_runs.load(Ordering::SeqCst)
    }

    fn new_hook(&self) -> AbdicationHook {
        AbdicationHook::new(Arc::new(CountingHookAction(Arc::clone(&self.hook_runs))))
    }

    /// Simulate the coordination service electing this replica, handing the
    /// listener a fresh, countable abdication hook.
    pub async fn elect(&self) {
        let listener = self.listener.lock().await.clone();
        if let Some(listener) = listener {
            listener.on_elected(self.new_hook()).await;
        }
    }

    /// Simulate the coordination service defeating this replica (another
    /// replica won, or this one's session expired).
    pub async fn defeat(&self) {
        let listener = self.listener.lock().await.clone();
        if let Some(listener) = listener {
            listener.on_defeated().await;
        }
    }
}

impl Default for FakeCandidate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Candidate for FakeCandidate {
    async fn offer_leadership(
        self: Arc<Self>,
        listener: Arc<dyn LeadershipListener>,
    ) -> Result<(), CoordinationError> {
        self.offer_count.fetch_add(1, Ordering::SeqCst);
        *self.listener.lock().await = Some(listener);
        Ok(())
    }
}
