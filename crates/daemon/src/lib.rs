// SPDX-License-Identifier: MIT

//! ms-daemon: binary wiring for the leader lifecycle core — builds every
//! collaborator named in spec.md §6 from [`ms_core::Config`] and drives
//! the [`ms_leader::ServiceLifecycleShell`] to completion.

pub mod wiring;

pub use wiring::{wire, WiredDaemon, WiringError};
