// SPDX-License-Identifier: MIT

//! Owns the single non-reusable driver instance for the current epoch.

use ms_driver::{Driver, DriverError};
use std::sync::Arc;

/// Holds at most one driver instance at a time. A driver handed to `stop`
/// is dropped; the next activation must construct a fresh instance via
/// the driver factory — this type never hands back a previously-stopped
/// driver.
pub struct DriverSupervisor<D: Driver> {
    current: Option<Arc<D>>,
}

impl<D: Driver> DriverSupervisor<D> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Install a freshly constructed driver as the current instance,
    /// returning a handle the caller spawns `run()` on.
    pub fn install(&mut self, driver: D) -> Arc<D> {
        debug_assert!(self.current.is_none(), "driver supervisor already holds a driver");
        let handle = Arc::new(driver);
        self.current = Some(Arc::clone(&handle));
        handle
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Gracefully stop the current driver, if any, signalling failover so
    /// the resource-offer master holds this replica's tasks briefly. The
    /// slot is cleared either way: the handle is never reused.
    pub async fn stop(&mut self) {
        if let Some(driver) = self.current.take() {
            driver.stop(true).await;
        }
    }

    /// Release the slot without calling `stop`, for when the driver has
    /// already exited on its own (crash, loss of mastership) rather than
    /// being stopped by this replica. The next activation still needs a
    /// fresh instance from the factory, so the slot must not be left
    /// occupied by a handle whose `run()` has already returned.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl<D: Driver> Default for DriverSupervisor<D> {
    fn default() -> Self {
        Self::new()
    }
}

pub type DriverRunResult = Result<(), DriverError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ms_driver::FakeDriver;

    #[tokio::test]
    async fn stop_clears_the_slot() {
        let mut supervisor: DriverSupervisor<FakeDriver> = DriverSupervisor::new();
        let handle = supervisor.install(FakeDriver::new());
        assert!(supervisor.is_running());
        supervisor.stop().await;
        assert!(!supervisor.is_running());
        assert_eq!(handle.stop_call_count(), 1);
        assert_eq!(handle.last_failover(), Some(true));
    }

    #[tokio::test]
    async fn clear_releases_the_slot_without_calling_stop() {
        let mut supervisor: DriverSupervisor<FakeDriver> = DriverSupervisor::new();
        let handle = supervisor.install(FakeDriver::new());
        supervisor.clear();
        assert!(!supervisor.is_running());
        assert_eq!(handle.stop_call_count(), 0, "the driver already exited on its own, stop is not called");
    }

    #[tokio::test]
    async fn stop_with_no_driver_is_harmless() {
        let mut supervisor: DriverSupervisor<FakeDriver> = DriverSupervisor::new();
        supervisor.stop().await;
        assert!(!supervisor.is_running());
    }

    #[test]
    #[should_panic(expected = "already holds a driver")]
    fn install_while_running_panics_in_debug() {
        let mut supervisor: DriverSupervisor<FakeDriver> = DriverSupervisor::new();
        supervisor.install(FakeDriver::new());
        supervisor.install(FakeDriver::new());
    }
}
