// SPDX-License-Identifier: MIT

//! The `Candidate` contract: registration with a coordination service that
//! arbitrates leadership among replicas.

use crate::hook::AbdicationHook;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("candidacy offer failed: {0}")]
    OfferFailed(String),
}

/// Callbacks invoked by the coordination service on its own threads/tasks.
/// `onElected`/`onDefeated` for a given epoch are serialized by the
/// coordination service; implementations may rely on that.
#[async_trait]
pub trait LeadershipListener: Send + Sync {
    async fn on_elected(&self, hook: AbdicationHook);
    async fn on_defeated(&self);
}

/// A candidate for leadership, registered with the coordination service.
///
/// Takes `self: Arc<Self>` because HA candidates spawn a background
/// election task that outlives the call and needs to hold a reference to
/// itself.
#[async_trait]
pub trait Candidate: Send + Sync + 'static {
    /// Register this replica as a candidate. In HA mode this registers
    /// asynchronously and returns once registration succeeds (election
    /// itself arrives later via the listener). In Solo mode this
    /// synchronously invokes `on_elected` with no abdication hook before
    /// returning.
    async fn offer_leadership(
        self: Arc<Self>,
        listener: Arc<dyn LeadershipListener>,
    ) -> Result<(), CoordinationError>;
}
