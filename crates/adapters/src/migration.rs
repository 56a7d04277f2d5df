// SPDX-License-Identifier: MIT

//! Schema/storage migrations run once at the head of the
//! elected-preparation sequence, before any callback fires.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("migration check failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Migration: Send + Sync {
    /// Bring storage up to the version this binary expects. Must be safe
    /// to call repeatedly — every elected epoch runs it again.
    async fn migrate(&self) -> Result<(), MigrationError>;
}

/// No migration work. Used in Solo/test configurations.
pub struct NullMigration;

#[async_trait]
impl Migration for NullMigration {
    async fn migrate(&self) -> Result<(), MigrationError> {
        Ok(())
    }
}

/// Verifies (and writes, if absent) a schema-version marker file,
/// grounded on a checkpoint-file-style migration check.
pub struct ChecksumMigration {
    marker_path: PathBuf,
    expected_version: u32,
}

impl ChecksumMigration {
    pub fn new(marker_path: impl Into<PathBuf>, expected_version: u32) -> Self {
        Self { marker_path: marker_path.into(), expected_version }
    }
}

#[async_trait]
impl Migration for ChecksumMigration {
    async fn migrate(&self) -> Result<(), MigrationError> {
        match fs::read_to_string(&self.marker_path).await {
            Ok(contents) => {
                let found: u32 = contents.trim().parse().map_err(|_| {
                    MigrationError::Failed(format!(
                        "marker file {:?} contains non-numeric version",
                        self.marker_path
                    ))
                })?;
                if found > self.expected_version {
                    return Err(MigrationError::Failed(format!(
                        "on-disk schema version {found} is newer than this binary's {}",
                        self.expected_version
                    )));
                }
                if found < self.expected_version {
                    fs::write(&self.marker_path, self.expected_version.to_string()).await?;
                    tracing::info!(from = found, to = self.expected_version, "schema migrated");
                }
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&self.marker_path, self.expected_version.to_string()).await?;
                tracing::info!(version = self.expected_version, "schema marker initialized");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
