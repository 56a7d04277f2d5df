// SPDX-License-Identifier: MIT

//! Stand-in for app-definition storage. `get_app`/`list_app_versions` on
//! the exposed surface (spec.md §6) are synchronous lookups bounded by
//! the coordination-service timeout; storage and validation themselves
//! are a declared Non-goal, so this is a narrow read-only contract plus
//! an in-memory implementation for wiring and tests.

use async_trait::async_trait;
use ms_core::{AppDefinition, AppId};
use parking_lot::RwLock;
use std::collections::HashMap;

#[async_trait]
pub trait AppRepository: Send + Sync {
    /// Look up one app, optionally pinned to a version. `None` means the
    /// latest known version.
    async fn get_app(&self, id: &AppId, version: Option<u64>) -> Option<AppDefinition>;

    /// All versions known for an app, oldest first.
    async fn list_app_versions(&self, id: &AppId) -> Vec<u64>;

    /// Every app id currently known to exist, regardless of version.
    /// Used by the orphan-expungement job to decide which tracked tasks
    /// belong to no known app.
    async fn known_app_ids(&self) -> Vec<AppId>;
}

/// In-memory app repository, keyed by app id, versions kept sorted
/// ascending. Good enough to back tests and a solo/dev deployment; a real
/// deployment would swap this for whatever backs app-definition storage.
#[derive(Default)]
pub struct InMemoryAppRepository {
    apps: RwLock<HashMap<AppId, Vec<AppDefinition>>>,
}

impl InMemoryAppRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, app: AppDefinition) {
        let mut apps = self.apps.write();
        let versions = apps.entry(app.id).or_default();
        versions.retain(|existing| existing.version != app.version);
        versions.push(app);
        versions.sort_by_key(|a| a.version);
    }
}

#[async_trait]
impl AppRepository for InMemoryAppRepository {
    async fn get_app(&self, id: &AppId, version: Option<u64>) -> Option<AppDefinition> {
        let apps = self.apps.read();
        let versions = apps.get(id)?;
        match version {
            Some(v) => versions.iter().find(|a| a.version == v).cloned(),
            None => versions.last().cloned(),
        }
    }

    async fn list_app_versions(&self, id: &AppId) -> Vec<u64> {
        self.apps.read().get(id).map(|versions| versions.iter().map(|a| a.version).collect()).unwrap_or_default()
    }

    async fn known_app_ids(&self) -> Vec<AppId> {
        self.apps.read().keys().cloned().collect()
    }
}
