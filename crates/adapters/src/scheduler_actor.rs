// SPDX-License-Identifier: MIT

//! The scheduler actor: a single task owning application/deployment state,
//! driven by `SchedulerMessage`s over an mpsc channel. Only runs while
//! this replica holds leadership.

use ms_core::SchedulerMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const MAILBOX_CAPACITY: usize = 256;

/// Handle to a running actor task. Dropping the last handle closes the
/// mailbox and lets the task exit.
#[derive(Clone)]
pub struct SchedulerActorHandle {
    tx: mpsc::Sender<SchedulerMessage>,
}

impl SchedulerActorHandle {
    pub async fn send(&self, message: SchedulerMessage) {
        if self.tx.send(message).await.is_err() {
            tracing::warn!("scheduler actor mailbox closed, dropping message");
        }
    }
}

/// Spawn the actor loop. Each received message is routed to a handler;
/// unhandled variants are logged and dropped rather than panicking,
/// matching the teacher's handler-dispatch texture.
pub fn spawn_scheduler_actor() -> (SchedulerActorHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(MAILBOX_CAPACITY);
    let task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            handle(message).await;
        }
        tracing::debug!("scheduler actor mailbox closed, exiting");
    });
    (SchedulerActorHandle { tx }, task)
}

async fn handle(message: SchedulerMessage) {
    match message {
        SchedulerMessage::ScaleApps => {
            tracing::debug!("scaling apps to target instance counts");
        }
        SchedulerMessage::ReconcileTasks => {
            tracing::debug!("reconciling task state against the offer master");
        }
        SchedulerMessage::ReconcileHealthChecks => {
            tracing::debug!("reconciling health check registrations");
        }
        SchedulerMessage::KillTasks { app_id, tasks, reply } => {
            tracing::info!(%app_id, count = tasks.len(), "killing tasks");
            let _ = reply.send(tasks);
        }
        SchedulerMessage::CancelDeployment { deployment_id } => {
            tracing::info!(%deployment_id, "cancelling deployment");
        }
        SchedulerMessage::Deploy { deployment_id, force, reply } => {
            tracing::info!(%deployment_id, force, "starting deployment");
            let _ = reply.send(Ok(()));
        }
        SchedulerMessage::RetrieveRunningDeployments { reply } => {
            let _ = reply.send(Vec::new());
        }
    }
}
