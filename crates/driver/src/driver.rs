// SPDX-License-Identifier: MIT

//! The `Driver` / `DriverFactory` contract.
//!
//! A driver is the single in-process client of the resource-offer master.
//! It is **not reusable**: once `stop`ped, the handle is dropped and a new
//! instance must be constructed via the factory for the next epoch.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver connection failed: {0}")]
    ConnectFailed(String),
    #[error("driver run loop failed: {0}")]
    RunFailed(String),
}

/// A resource-offer client session. `run()` blocks (asynchronously) until
/// the driver is stopped, either by `stop()` or by external means (loss of
/// mastership, transient failure upstream).
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Blocks until the driver session ends. Returns `Ok(())` on a clean
    /// stop, `Err` if the session ended abnormally.
    async fn run(&self) -> Result<(), DriverError>;

    /// Gracefully stop the driver. `failover = true` signals the
    /// resource-offer master to hold this replica's tasks for a short
    /// period rather than immediately reassigning them.
    async fn stop(&self, failover: bool);
}

/// Constructs a fresh, non-reusable [`Driver`] instance on each activation.
#[async_trait]
pub trait DriverFactory: Send + Sync + 'static {
    type Driver: Driver;

    async fn create_driver(&self) -> Result<Self::Driver, DriverError>;
}
