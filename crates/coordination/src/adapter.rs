// SPDX-License-Identifier: MIT

//! Thin indirection over the coordination-service client.
//!
//! Access to the underlying candidate is serialized by a monitor so
//! concurrent offers (e.g. from the driver-exit path racing a
//! failure-recovery path) cannot interleave, per spec.md §4.2.

use crate::candidate::{Candidate, CoordinationError, LeadershipListener};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct CandidacyAdapter {
    candidate: Arc<dyn Candidate>,
    offer_lock: Mutex<()>,
}

impl CandidacyAdapter {
    pub fn new(candidate: Arc<dyn Candidate>) -> Self {
        Self { candidate, offer_lock: Mutex::new(()) }
    }

    /// Offer candidacy. Serialized: only one offer is in flight at a time.
    pub async fn offer(
        &self,
        listener: Arc<dyn LeadershipListener>,
    ) -> Result<(), CoordinationError> {
        let _guard = self.offer_lock.lock().await;
        Arc::clone(&self.candidate).offer_leadership(listener).await
    }
}
