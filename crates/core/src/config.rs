// SPDX-License-Identifier: MIT

//! Leader lifecycle configuration.
//!
//! Recognized keys, mirroring spec.md §6: `zkTimeout`, the four ticker
//! timings, `onElectedPrepareTimeout`, and `maxActorStartupTime`. Loaded
//! from a TOML file with environment-variable overrides for the
//! coordination-service identity, the way `oj-daemon::lifecycle::Config`
//! loads from a fixed state directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

fn duration_ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Leader lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Coordination timeout for synchronous lookups and callback aggregation.
    pub zk_timeout_ms: u64,
    /// Initial delay before the first reconciliation/expunge-orphans fire.
    pub reconciliation_initial_delay_ms: u64,
    /// Period between reconciliation ticks.
    pub reconciliation_interval_ms: u64,
    /// Initial delay before the first scale-apps fire.
    pub scale_apps_initial_delay_ms: u64,
    /// Period between scale-apps ticks.
    pub scale_apps_interval_ms: u64,
    /// Bound on leadership-callback completion during preparation.
    pub on_elected_prepare_timeout_ms: u64,
    /// Bound on leadership-coordinator prepare during preparation.
    pub max_actor_startup_time_ms: u64,
    /// Kubernetes namespace holding the coordination Lease (HA mode).
    pub namespace: String,
    /// Name of the coordination.k8s.io/v1 Lease used for candidacy.
    pub lease_name: String,
    /// Stable identity for this replica's lease holder identity.
    pub replica_id: String,
    /// Whether to run without a coordination service (single replica).
    pub solo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zk_timeout_ms: 10_000,
            reconciliation_initial_delay_ms: 15_000,
            reconciliation_interval_ms: 30_000,
            scale_apps_initial_delay_ms: 5_000,
            scale_apps_interval_ms: 30_000,
            on_elected_prepare_timeout_ms: 10_000,
            max_actor_startup_time_ms: 10_000,
            namespace: "default".to_string(),
            lease_name: "ms-scheduler-leader".to_string(),
            replica_id: "replica-1".to_string(),
            solo: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for any
    /// key not present. Environment variables `MS_NAMESPACE`, `MS_LEASE_NAME`,
    /// and `MS_REPLICA_ID` override the corresponding file values, the way
    /// the teacher's daemon config resolves its state directory from env.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?
        } else {
            Config::default()
        };

        if let Ok(ns) = std::env::var("MS_NAMESPACE") {
            config.namespace = ns;
        }
        if let Ok(name) = std::env::var("MS_LEASE_NAME") {
            config.lease_name = name;
        }
        if let Ok(id) = std::env::var("MS_REPLICA_ID") {
            config.replica_id = id;
        }

        Ok(config)
    }

    pub fn zk_timeout(&self) -> Duration {
        duration_ms(self.zk_timeout_ms)
    }

    pub fn reconciliation_initial_delay(&self) -> Duration {
        duration_ms(self.reconciliation_initial_delay_ms)
    }

    pub fn reconciliation_interval(&self) -> Duration {
        duration_ms(self.reconciliation_interval_ms)
    }

    pub fn scale_apps_initial_delay(&self) -> Duration {
        duration_ms(self.scale_apps_initial_delay_ms)
    }

    pub fn scale_apps_interval(&self) -> Duration {
        duration_ms(self.scale_apps_interval_ms)
    }

    pub fn on_elected_prepare_timeout(&self) -> Duration {
        duration_ms(self.on_elected_prepare_timeout_ms)
    }

    pub fn max_actor_startup_time(&self) -> Duration {
        duration_ms(self.max_actor_startup_time_ms)
    }
}
