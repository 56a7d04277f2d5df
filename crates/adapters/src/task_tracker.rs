// SPDX-License-Identifier: MIT

//! In-memory tracker of known tasks, reset on every defeat and reconciled
//! against external truth by the periodic ticker.

use ms_core::{AppId, TaskId};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct Inner {
    tasks: HashMap<TaskId, AppId>,
}

/// Tracks task ids known to be owned by this scheduler instance.
///
/// Cleared on every defeat (`clear()`), so a freshly elected replica
/// starts from an empty set and repopulates it via reconciliation rather
/// than trusting state left over from a prior epoch.
pub struct TaskTracker {
    inner: Mutex<Inner>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    pub fn track(&self, task_id: TaskId, app_id: AppId) {
        self.inner.lock().tasks.insert(task_id, app_id);
    }

    pub fn untrack(&self, task_id: &TaskId) {
        self.inner.lock().tasks.remove(task_id);
    }

    pub fn is_known(&self, task_id: &TaskId) -> bool {
        self.inner.lock().tasks.contains_key(task_id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all tracked tasks. Called when leadership is relinquished.
    pub fn clear(&self) {
        self.inner.lock().tasks.clear();
    }

    /// Given the set of app ids currently known to exist, remove (and
    /// return) every tracked task whose owning app is not among them —
    /// per spec.md §4.5, orphans are tasks belonging to no known app, not
    /// tasks merely absent from the offer master's live set.
    pub fn expunge_orphaned_tasks(&self, known_apps: &[AppId]) -> Vec<TaskId> {
        let mut inner = self.inner.lock();
        let orphaned: Vec<TaskId> =
            inner.tasks.iter().filter(|(_, app_id)| !known_apps.contains(app_id)).map(|(task_id, _)| *task_id).collect();
        for task_id in &orphaned {
            inner.tasks.remove(task_id);
        }
        orphaned
    }
}

impl Default for TaskTracker {
    fn default() -> Self {
        Self::new()
    }
}
