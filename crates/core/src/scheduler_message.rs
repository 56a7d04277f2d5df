// SPDX-License-Identifier: MIT

//! Fire-and-forget message set accepted by the in-process scheduler actor.
//!
//! This is the narrow contract named in spec.md §6; the actor itself
//! (task placement, deployment planning) is out of scope here.

use crate::id::{AppId, DeploymentId, TaskId};

/// Messages the leader core sends to the scheduler actor. All are
/// fire-and-forget except where the exposed surface awaits a reply
/// (modeled with a oneshot reply channel on the message itself).
#[derive(Debug)]
pub enum SchedulerMessage {
    /// Periodic tick: recompute and apply desired scale for every app.
    ScaleApps,
    /// Periodic tick: reconcile known tasks against the resource-offer master.
    ReconcileTasks,
    /// Periodic tick: reconcile health-check state for known tasks.
    ReconcileHealthChecks,
    /// Kill the given tasks belonging to `app_id`, echoing back the ids killed.
    KillTasks { app_id: AppId, tasks: Vec<TaskId>, reply: tokio::sync::oneshot::Sender<Vec<TaskId>> },
    /// Cancel an in-flight deployment.
    CancelDeployment { deployment_id: DeploymentId },
    /// Start a new deployment; resolves once the deployment has *started*
    /// (not completed), or fails with the original cause on command failure.
    Deploy {
        deployment_id: DeploymentId,
        force: bool,
        reply: tokio::sync::oneshot::Sender<Result<(), String>>,
    },
    /// List deployments currently running, bounded by the caller's timeout.
    RetrieveRunningDeployments { reply: tokio::sync::oneshot::Sender<Vec<DeploymentId>> },
}
