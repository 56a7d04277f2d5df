// SPDX-License-Identifier: MIT

//! Scriptable fake driver and factory for leader-lifecycle tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::driver::{Driver, DriverError, DriverFactory};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A driver whose `run()` blocks until `stop()` is called (or the test
/// forces it to exit via [`FakeDriver::force_exit`]), recording how many
/// times each method was invoked.
pub struct FakeDriver {
    stop: Notify,
    force_exit: Arc<Notify>,
    stop_calls: Arc<AtomicUsize>,
    last_failover: Arc<std::sync::Mutex<Option<bool>>>,
    fail_on_exit: bool,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::with_force_exit(Arc::new(Notify::new()), false)
    }

    /// Build a driver whose `run()` resolves with an error as soon as it is
    /// forced to exit, simulating a driver crash (S5).
    pub fn crashing() -> Self {
        Self::with_force_exit(Arc::new(Notify::new()), true)
    }

    /// Build a driver sharing an externally-held `force_exit` signal, so a
    /// test can crash whichever instance the factory most recently handed
    /// to the state machine without holding the instance itself.
    pub fn with_force_exit(force_exit: Arc<Notify>, fail_on_exit: bool) -> Self {
        Self {
            stop: Notify::new(),
            force_exit,
            stop_calls: Arc::new(AtomicUsize::new(0)),
            last_failover: Arc::new(std::sync::Mutex::new(None)),
            fail_on_exit,
        }
    }

    pub fn stop_call_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn last_failover(&self) -> Option<bool> {
        *self.last_failover.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Force `run()` to return as if the driver exited on its own (external
    /// loss of mastership, transient failure) rather than via `stop()`.
    pub fn force_exit(&self) {
        self.force_exit.notify_one();
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn run(&self) -> Result<(), DriverError> {
        tokio::select! {
            _ = self.stop.notified() => Ok(()),
            _ = self.force_exit.notified() => {
                if self.fail_on_exit {
                    Err(DriverError::RunFailed("fake driver crash".to_string()))
                } else {
                    Ok(())
                }
            }
        }
    }

    async fn stop(&self, failover: bool) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_failover.lock().unwrap_or_else(|e| e.into_inner()) = Some(failover);
        self.stop.notify_one();
    }
}

/// Counts how many driver instances have been constructed, to verify the
/// "driver singleton per epoch, never reused" invariant in tests.
#[derive(Clone)]
pub struct FakeDriverFactory {
    created: Arc<AtomicUsize>,
    crashing: bool,
    shared_force_exit: Option<Arc<Notify>>,
}

impl FakeDriverFactory {
    pub fn new() -> Self {
        Self { created: Arc::new(AtomicUsize::new(0)), crashing: false, shared_force_exit: None }
    }

    pub fn crashing() -> Self {
        Self { created: Arc::new(AtomicUsize::new(0)), crashing: true, shared_force_exit: None }
    }

    /// Build a factory whose every produced driver shares one `force_exit`
    /// signal, returned alongside it so a test can crash whichever instance
    /// the state machine is currently running without holding the instance.
    pub fn with_shared_force_exit() -> (Self, Arc<Notify>) {
        let notify = Arc::new(Notify::new());
        let factory = Self {
            created: Arc::new(AtomicUsize::new(0)),
            crashing: true,
            shared_force_exit: Some(Arc::clone(&notify)),
        };
        (factory, notify)
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl Default for FakeDriverFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriverFactory for FakeDriverFactory {
    type Driver = FakeDriver;

    async fn create_driver(&self) -> Result<Self::Driver, DriverError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.shared_force_exit {
            Some(notify) => FakeDriver::with_force_exit(Arc::clone(notify), self.crashing),
            None => {
                if self.crashing {
                    FakeDriver::crashing()
                } else {
                    FakeDriver::new()
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_unblocks_run() {
        let driver = Arc::new(FakeDriver::new());
        let run_driver = Arc::clone(&driver);
        let run = tokio::spawn(async move { run_driver.run().await });
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        driver.stop(true).await;
        assert!(run.await.unwrap().is_ok());
        assert_eq!(driver.stop_call_count(), 1);
        assert_eq!(driver.last_failover(), Some(true));
    }

    #[tokio::test]
    async fn force_exit_on_crashing_driver_returns_err() {
        let driver = Arc::new(FakeDriver::crashing());
        let run_driver = Arc::clone(&driver);
        let run = tokio::spawn(async move { run_driver.run().await });
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        driver.force_exit();
        assert!(run.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn factory_counts_creations() {
        let factory = FakeDriverFactory::new();
        let _ = factory.create_driver().await.unwrap();
        let _ = factory.create_driver().await.unwrap();
        assert_eq!(factory.created_count(), 2);
    }
}
