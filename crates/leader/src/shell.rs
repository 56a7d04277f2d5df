// SPDX-License-Identifier: MIT

//! The service lifecycle shell: `start_up → run → trigger_shutdown`.
//!
//! The run future is the ownership anchor for the whole leader core;
//! leadership callbacks arrive on coordination-service tasks and mutate
//! state conceptually owned by this future. The shutdown latch decouples
//! "work available" from "process should exit".

use crate::state_machine::LeaderStateMachine;
use ms_driver::DriverFactory;
use std::sync::Arc;
use std::time::Instant;

pub struct ServiceLifecycleShell<F: DriverFactory> {
    state_machine: Arc<LeaderStateMachine<F>>,
    started_at: Option<Instant>,
}

impl<F: DriverFactory> ServiceLifecycleShell<F> {
    pub fn new(state_machine: Arc<LeaderStateMachine<F>>) -> Self {
        Self { state_machine, started_at: None }
    }

    pub fn start_up(&mut self) {
        self.started_at = Some(Instant::now());
        tracing::info!("leader lifecycle shell starting up");
    }

    /// Offer candidacy, then block until `trigger_shutdown` is called.
    /// Must not return before shutdown.
    pub async fn run(&self) {
        self.state_machine.offer().await;
        self.state_machine.wait_for_shutdown().await;
        tracing::info!("leader lifecycle shell run loop returning after shutdown");
    }

    /// Idempotent: repeated calls are no-ops after the first.
    pub async fn trigger_shutdown(&self) {
        self.state_machine.trigger_shutdown().await;
    }

    pub fn state_machine(&self) -> &Arc<LeaderStateMachine<F>> {
        &self.state_machine
    }
}
