// SPDX-License-Identifier: MIT

//! Solo mode: no coordination service. The replica self-elects immediately.

use crate::candidate::{Candidate, CoordinationError, LeadershipListener};
use crate::hook::AbdicationHook;
use async_trait::async_trait;
use std::sync::Arc;

/// No candidate present. `offer_leadership` synchronously invokes
/// `on_elected` with no abdication hook, per spec.md §4.2.
pub struct SoloCandidate;

impl SoloCandidate {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SoloCandidate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Candidate for SoloCandidate {
    async fn offer_leadership(
        self: Arc<Self>,
        listener: Arc<dyn LeadershipListener>,
    ) -> Result<(), CoordinationError> {
        listener.on_elected(AbdicationHook::noop()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct RecordingListener(Arc<AtomicBool>);

    #[async_trait]
    impl LeadershipListener for RecordingListener {
        async fn on_elected(&self, hook: AbdicationHook) {
            assert!(!hook.has_run());
            self.0.store(true, Ordering::SeqCst);
        }
        async fn on_defeated(&self) {}
    }

    #[tokio::test]
    async fn offer_immediately_elects() {
        let elected = Arc::new(AtomicBool::new(false));
        let candidate = Arc::new(SoloCandidate::new());
        candidate
            .offer_leadership(Arc::new(RecordingListener(Arc::clone(&elected))))
            .await
            .unwrap();
        assert!(elected.load(Ordering::SeqCst));
    }
}
