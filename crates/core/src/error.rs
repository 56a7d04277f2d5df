// SPDX-License-Identifier: MIT

//! Error kinds shared across the leader lifecycle core.

use thiserror::Error;

/// Errors that can abort the elected-preparation sequence or an
/// in-progress epoch. Every variant here maps to one of the recovery
/// rules in the error-handling design: no error locally recovers
/// leadership, every failure in the critical path abdicates and re-offers.
#[derive(Debug, Error)]
pub enum LeaderError {
    #[error("data migration failed: {0}")]
    MigrationFailed(String),

    #[error("onElected leadership callback failed: {0}")]
    CallbackFailed(String),

    #[error("leadership coordinator failed to prepare: {0}")]
    CoordinatorPrepareFailed(String),

    #[error("driver construction failed: {0}")]
    DriverConstructionFailed(String),

    #[error("driver exited with error: {0}")]
    DriverFailed(String),

    #[error("preparation step timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("coordination-service call timed out")]
    CoordinationTimeout,

    #[error("candidacy adapter error: {0}")]
    Adapter(String),
}

/// Convenience alias used throughout the leader crates.
pub type LeaderResult<T> = Result<T, LeaderError>;
