// SPDX-License-Identifier: MIT

//! Deployment-plan shape carried across the exposed surface.
//!
//! Deployment planning and rolling-upgrade orchestration are a declared
//! Non-goal of this core (spec.md §1); `DeploymentPlan` is opaque here
//! beyond its id and the apps it touches, the rest is the scheduler
//! actor's concern.

use crate::id::{AppId, DeploymentId};

#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub id: DeploymentId,
    pub app_ids: Vec<AppId>,
}
