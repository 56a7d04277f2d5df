// SPDX-License-Identifier: MIT

//! The surface exposed to the HTTP API and other peers (spec.md §6):
//! `deploy`, `cancel_deployment`, `list_running_deployments`, `get_app`,
//! `list_app_versions`, `kill_tasks`. The HTTP transport itself is a
//! declared Non-goal, so these are plain async methods any transport
//! could call; they forward to the scheduler actor or the app
//! repository and add nothing of their own beyond timeout bounds.

use ms_adapters::{AppRepository, SchedulerActorHandle};
use ms_core::{AppDefinition, AppId, DeploymentId, DeploymentPlan, SchedulerMessage, TaskId};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("scheduler actor did not respond within {0:?}")]
    Timeout(Duration),
    #[error("deploy command failed: {0}")]
    DeployFailed(String),
    #[error("scheduler actor mailbox closed before replying")]
    ActorGone,
}

/// Thin façade over the scheduler actor and app repository, bounded by
/// `zkTimeout` for synchronous lookups per spec.md §6.
pub struct SchedulerFacade {
    actor: SchedulerActorHandle,
    app_repository: Arc<dyn AppRepository>,
    lookup_timeout: Duration,
}

impl SchedulerFacade {
    pub fn new(actor: SchedulerActorHandle, app_repository: Arc<dyn AppRepository>, lookup_timeout: Duration) -> Self {
        Self { actor, app_repository, lookup_timeout }
    }

    /// Resolves once the deployment has *started* (not completed), or
    /// fails with the original cause on command failure.
    pub async fn deploy(&self, plan: DeploymentPlan, force: bool) -> Result<(), FacadeError> {
        let (reply, rx) = oneshot::channel();
        self.actor.send(SchedulerMessage::Deploy { deployment_id: plan.id, force, reply }).await;
        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(FacadeError::DeployFailed(reason)),
            Err(_) => Err(FacadeError::ActorGone),
        }
    }

    /// Fire-and-forget.
    pub async fn cancel_deployment(&self, deployment_id: DeploymentId) {
        self.actor.send(SchedulerMessage::CancelDeployment { deployment_id }).await;
    }

    /// On scheduler-actor timeout, fails with a timeout error.
    pub async fn list_running_deployments(&self) -> Result<Vec<DeploymentId>, FacadeError> {
        let (reply, rx) = oneshot::channel();
        self.actor.send(SchedulerMessage::RetrieveRunningDeployments { reply }).await;
        match tokio::time::timeout(self.lookup_timeout, rx).await {
            Ok(Ok(deployments)) => Ok(deployments),
            Ok(Err(_)) => Err(FacadeError::ActorGone),
            Err(_) => Err(FacadeError::Timeout(self.lookup_timeout)),
        }
    }

    /// Synchronous lookup bounded by the coordination-service timeout.
    pub async fn get_app(&self, id: &AppId, version: Option<u64>) -> Result<Option<AppDefinition>, FacadeError> {
        tokio::time::timeout(self.lookup_timeout, self.app_repository.get_app(id, version))
            .await
            .map_err(|_| FacadeError::Timeout(self.lookup_timeout))
    }

    /// Synchronous lookup bounded by the coordination-service timeout.
    pub async fn list_app_versions(&self, id: &AppId) -> Result<Vec<u64>, FacadeError> {
        tokio::time::timeout(self.lookup_timeout, self.app_repository.list_app_versions(id))
            .await
            .map_err(|_| FacadeError::Timeout(self.lookup_timeout))
    }

    /// Fire-and-forget with echo: returns once the actor has accepted the
    /// kill command, echoing back the task ids it was asked to kill.
    pub async fn kill_tasks(&self, app_id: AppId, tasks: Vec<TaskId>) -> Result<Vec<TaskId>, FacadeError> {
        let (reply, rx) = oneshot::channel();
        self.actor.send(SchedulerMessage::KillTasks { app_id, tasks, reply }).await;
        rx.await.map_err(|_| FacadeError::ActorGone)
    }
}
