// SPDX-License-Identifier: MIT

//! Publishes leadership transitions to any number of subscribers.

use ms_core::LeadershipEvent;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LeadershipEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LeadershipEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Silently dropped if there are no subscribers.
    pub fn publish(&self, event: LeadershipEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
