// SPDX-License-Identifier: MIT

//! Events published on leadership transitions.

use serde::{Deserialize, Serialize};

/// Events the leader state machine publishes to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadershipEvent {
    /// Published once activation completes successfully for an epoch.
    ElectedAsLeader,
    /// Published once the defeat sequence (ticker cancel, driver stop,
    /// task-tracker clear) completes for an epoch.
    Standby,
}
