// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! ms-adapters: stand-ins for the named external collaborators — event
//! bus, task tracker, scheduler actor, leadership coordinator, migration,
//! app repository, and leadership callbacks.

pub mod app_repository;
pub mod callback;
pub mod coordinator;
pub mod event_bus;
pub mod migration;
pub mod scheduler_actor;
pub mod task_tracker;

pub use app_repository::{AppRepository, InMemoryAppRepository};
pub use callback::{CallbackError, CallbackRegistry, LeadershipCallback};
pub use coordinator::{CoordinatorError, LeadershipCoordinator, NotifyCoordinator};
pub use event_bus::EventBus;
pub use migration::{ChecksumMigration, Migration, MigrationError, NullMigration};
pub use scheduler_actor::{spawn_scheduler_actor, SchedulerActorHandle};
pub use task_tracker::TaskTracker;
