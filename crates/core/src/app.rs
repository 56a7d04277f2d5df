// SPDX-License-Identifier: MIT

//! Minimal application-definition shape.
//!
//! App-definition persistence and validation are a declared Non-goal of
//! this core (spec.md §1); this type only carries what the exposed
//! `get_app`/`list_app_versions` lookups need to answer with, leaving
//! real storage to a collaborator behind [`crate::AppId`].

use crate::id::AppId;

/// An opaque, versioned application definition. Real app storage lives in
/// a collaborator; this core only forwards lookups to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDefinition {
    pub id: AppId,
    pub version: u64,
}
