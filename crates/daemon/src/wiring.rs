// SPDX-License-Identifier: MIT

//! Wires every collaborator named in spec.md §6 into a
//! [`ms_leader::LeaderStateMachine`] and a [`ms_leader::SchedulerFacade`],
//! choosing HA (Kubernetes Lease) or Solo candidacy from [`ms_core::Config`].

use ms_adapters::{
    spawn_scheduler_actor, AppRepository, CallbackRegistry, EventBus, InMemoryAppRepository, NotifyCoordinator,
    NullMigration, TaskTracker,
};
use ms_core::Config;
use ms_coordination::{Candidate, CandidacyAdapter, K8sLeaseCandidate, SoloCandidate};
use ms_driver::WsOfferDriverFactory;
use ms_leader::{Collaborators, LeaderStateMachine, SchedulerFacade, ServiceLifecycleShell};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("failed to build kubernetes client: {0}")]
    KubeClient(#[from] kube::Error),
}

/// Everything `main` needs to drive the process: the shell (own the run
/// loop), the facade (exposed surface for a future transport), and the
/// scheduler-actor background task (kept alive for as long as the
/// process runs).
pub struct WiredDaemon {
    pub shell: ServiceLifecycleShell<WsOfferDriverFactory>,
    pub facade: Arc<SchedulerFacade>,
    pub scheduler_actor_task: tokio::task::JoinHandle<()>,
}

/// Build every collaborator and wire them into the leader state machine.
/// `master_url` is the resource-offer master's offer-stream endpoint.
pub async fn wire(config: Config, master_url: impl Into<String>) -> Result<WiredDaemon, WiringError> {
    let (scheduler_actor, scheduler_actor_task) = spawn_scheduler_actor();

    let candidate: Arc<dyn Candidate> = if config.solo {
        tracing::info!("no coordination service configured, running solo");
        Arc::new(SoloCandidate::new())
    } else {
        let client = kube::Client::try_default().await?;
        tracing::info!(namespace = %config.namespace, lease = %config.lease_name, "coordinating via kubernetes lease");
        Arc::new(K8sLeaseCandidate::new(client, &config.namespace, config.lease_name.clone(), config.replica_id.clone()))
    };

    let app_repository = Arc::new(InMemoryAppRepository::new());
    let facade = Arc::new(SchedulerFacade::new(
        scheduler_actor.clone(),
        Arc::clone(&app_repository) as Arc<dyn AppRepository>,
        config.zk_timeout(),
    ));

    let collaborators: Collaborators<WsOfferDriverFactory> = Collaborators {
        candidate: CandidacyAdapter::new(candidate),
        driver_factory: WsOfferDriverFactory::new(master_url),
        migration: Arc::new(NullMigration),
        callbacks: Arc::new(CallbackRegistry::new(vec![], config.on_elected_prepare_timeout())),
        coordinator: Arc::new(NotifyCoordinator::new().also_ready()),
        event_bus: EventBus::new(),
        scheduler_actor,
        task_tracker: Arc::new(TaskTracker::new()),
        app_repository,
    };

    let state_machine = LeaderStateMachine::new(collaborators, config);
    let shell = ServiceLifecycleShell::new(state_machine);

    Ok(WiredDaemon { shell, facade, scheduler_actor_task })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solo_config() -> Config {
        Config { solo: true, ..Config::default() }
    }

    #[tokio::test]
    async fn solo_wiring_assembles_without_a_coordination_service() {
        let daemon = wire(solo_config(), "ws://127.0.0.1:1/offers").await.unwrap();
        assert!(!daemon.shell.state_machine().leader_flag().is_leader());
        assert!(!daemon.shell.state_machine().is_shutting_down());
        daemon.scheduler_actor_task.abort();
    }

    #[tokio::test]
    async fn shutdown_before_run_is_idempotent() {
        let daemon = wire(solo_config(), "ws://127.0.0.1:1/offers").await.unwrap();
        let state_machine = daemon.shell.state_machine().clone();
        state_machine.trigger_shutdown().await;
        state_machine.trigger_shutdown().await;
        assert!(state_machine.is_shutting_down());
        daemon.scheduler_actor_task.abort();
    }
}
