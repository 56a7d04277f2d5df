// SPDX-License-Identifier: MIT

//! The abdication hook: an idempotent action handed to the state machine
//! with every `elected` event that relinquishes candidacy.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[async_trait]
pub(crate) trait HookAction: Send + Sync {
    async fn run(&self);
}

/// An idempotent action that relinquishes candidacy. Executed exactly once
/// per epoch, either by the driver-exit handler or by the
/// elected-preparation failure path — never both.
#[derive(Clone)]
pub struct AbdicationHook {
    action: Arc<dyn HookAction>,
    ran: Arc<AtomicBool>,
}

impl AbdicationHook {
    pub(crate) fn new(action: Arc<dyn HookAction>) -> Self {
        Self { action, ran: Arc::new(AtomicBool::new(false)) }
    }

    /// A hook that does nothing, used in Solo mode where there is no
    /// coordination service to relinquish candidacy with.
    pub fn noop() -> Self {
        struct Noop;
        #[async_trait]
        impl HookAction for Noop {
            async fn run(&self) {}
        }
        Self::new(Arc::new(Noop))
    }

    /// Run the hook. Safe to call more than once; only the first call has
    /// any effect.
    pub async fn run(&self) {
        if self.ran.swap(true, Ordering::AcqRel) {
            tracing::debug!("abdication hook already executed this epoch, skipping");
            return;
        }
        self.action.run().await;
    }

    pub fn has_run(&self) -> bool {
        self.ran.load(Ordering::Acquire)
    }
}
