// SPDX-License-Identifier: MIT

//! Process-wide observable leadership flag.
//!
//! `LeaderFlag = true` iff a driver is (about to be, is, or was just)
//! running for the current epoch. The state machine is the sole writer;
//! ticker jobs and any other peripheral subsystem are read-only observers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Read-only view of the leader flag, safe to hand out to ticker jobs and
/// other subsystems that must gate work on current leadership.
#[derive(Clone)]
pub struct LeaderFlagReader(Arc<AtomicBool>);

impl LeaderFlagReader {
    pub fn is_leader(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Owning handle to the leader flag. Only the leader state machine holds
/// one of these; it is the sole writer.
#[derive(Clone)]
pub struct LeaderFlag(Arc<AtomicBool>);

impl LeaderFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self, leader: bool) {
        self.0.store(leader, Ordering::Release);
    }

    pub fn is_leader(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn reader(&self) -> LeaderFlagReader {
        LeaderFlagReader(Arc::clone(&self.0))
    }
}

impl Default for LeaderFlag {
    fn default() -> Self {
        Self::new()
    }
}
