// SPDX-License-Identifier: MIT

//! Leadership lifecycle callbacks: collaborators who need to react to
//! election/defeat but aren't on the critical elected-preparation path.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("onElected callback {0} failed: {1}")]
    ElectedFailed(String, String),
    #[error("onElected callbacks did not complete within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait LeadershipCallback: Send + Sync {
    fn name(&self) -> &str;
    async fn on_elected(&self) -> Result<(), String>;
    async fn on_defeated(&self);
}

/// Fan-out list of registered callbacks, run with a shared timeout.
pub struct CallbackRegistry {
    callbacks: Vec<Arc<dyn LeadershipCallback>>,
    elected_timeout: Duration,
}

impl CallbackRegistry {
    pub fn new(callbacks: Vec<Arc<dyn LeadershipCallback>>, elected_timeout: Duration) -> Self {
        Self { callbacks, elected_timeout }
    }

    /// Run every `on_elected` callback concurrently, bounded by the shared
    /// timeout. The first failure (or the timeout) aborts the sequence;
    /// per spec.md, preparation failure abdicates rather than retrying.
    pub async fn run_elected(&self) -> Result<(), CallbackError> {
        let joined = futures_util::future::join_all(
            self.callbacks.iter().map(|cb| async move { (cb.name().to_string(), cb.on_elected().await)}),
        );
        match tokio::time::timeout(self.elected_timeout, joined).await {
            Ok(results) => {
                for (name, result) in results {
                    if let Err(e) = result {
                        return Err(CallbackError::ElectedFailed(name, e));
                    }
                }
                Ok(())
            }
            Err(_) => Err(CallbackError::Timeout(self.elected_timeout)),
        }
    }

    pub async fn run_defeated(&self) {
        futures_util::future::join_all(self.callbacks.iter().map(|cb| cb.on_defeated())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Recorder {
        name: &'static str,
        fail: bool,
        elected: Arc<AtomicBool>,
        defeated: Arc<AtomicBool>,
    }

    #[async_trait]
    impl LeadershipCallback for Recorder {
        fn name(&self) -> &str {
            self.name
        }
        async fn on_elected(&self) -> Result<(), String> {
            self.elected.store(true, Ordering::SeqCst);
            if self.fail {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        }
        async fn on_defeated(&self) {
            self.defeated.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn all_callbacks_run_on_success() {
        let elected = Arc::new(AtomicBool::new(false));
        let registry = CallbackRegistry::new(
            vec![Arc::new(Recorder {
                name: "a",
                fail: false,
                elected: Arc::clone(&elected),
                defeated: Arc::new(AtomicBool::new(false)),
            })],
            Duration::from_secs(1),
        );
        registry.run_elected().await.unwrap();
        assert!(elected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failing_callback_surfaces_error() {
        let registry = CallbackRegistry::new(
            vec![Arc::new(Recorder {
                name: "b",
                fail: true,
                elected: Arc::new(AtomicBool::new(false)),
                defeated: Arc::new(AtomicBool::new(false)),
            })],
            Duration::from_secs(1),
        );
        let err = registry.run_elected().await.unwrap_err();
        assert!(matches!(err, CallbackError::ElectedFailed(name, _) if name == "b"));
    }

    #[tokio::test]
    async fn run_defeated_notifies_all() {
        let defeated = Arc::new(AtomicBool::new(false));
        let registry = CallbackRegistry::new(
            vec![Arc::new(Recorder {
                name: "c",
                fail: false,
                elected: Arc::new(AtomicBool::new(false)),
                defeated: Arc::clone(&defeated),
            })],
            Duration::from_secs(1),
        );
        registry.run_defeated().await;
        assert!(defeated.load(Ordering::SeqCst));
    }
}
