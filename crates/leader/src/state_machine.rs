// SPDX-License-Identifier: MIT

//! The leader state machine: offers candidacy, runs the elected
//! preparation sequence, owns the driver supervisor and ticker for the
//! current epoch, and reacts to defeat.

use crate::backoff::BackoffController;
use crate::driver_supervisor::DriverSupervisor;
use crate::ticker::{PeriodicTicker, TickerConfig};
use async_trait::async_trait;
use ms_adapters::{
    AppRepository, CallbackRegistry, EventBus, LeadershipCoordinator, Migration, SchedulerActorHandle, TaskTracker,
};
use ms_coordination::{AbdicationHook, Candidate, CandidacyAdapter, LeadershipListener};
use ms_core::{Config, LeaderError, LeaderFlag, LeaderResult, LeadershipEvent};
use ms_driver::{Driver, DriverFactory};
use parking_lot::Mutex as SyncMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, Notify};

/// Collaborators the state machine drives during the elected-preparation
/// sequence and normal operation. Grouped so construction takes one
/// argument instead of seven.
pub struct Collaborators<F: DriverFactory> {
    pub candidate: CandidacyAdapter,
    pub driver_factory: F,
    pub migration: Arc<dyn Migration>,
    pub callbacks: Arc<CallbackRegistry>,
    pub coordinator: Arc<dyn LeadershipCoordinator>,
    pub event_bus: EventBus,
    pub scheduler_actor: SchedulerActorHandle,
    pub task_tracker: Arc<TaskTracker>,
    pub app_repository: Arc<dyn AppRepository>,
}

/// Central controller. One instance per process. `driver_supervisor`
/// guards `stop`/`install`, which await; `ticker` is swapped
/// synchronously since `PeriodicTicker`'s drop only aborts tasks.
pub struct LeaderStateMachine<F: DriverFactory> {
    collaborators: Collaborators<F>,
    config: Config,
    leader_flag: LeaderFlag,
    backoff: BackoffController,
    driver_supervisor: AsyncMutex<DriverSupervisor<F::Driver>>,
    ticker: SyncMutex<Option<PeriodicTicker>>,
    shutting_down: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
    /// Set by `on_defeated`/`trigger_shutdown` just before they stop the
    /// driver, so the driver-exit handler this unblocks can tell "we were
    /// defeated/shut down" apart from "the driver exited on its own". Only
    /// the latter owns the abdication hook and the re-offer; otherwise
    /// both paths would re-offer (and, worse, run the hook) for the same
    /// epoch end.
    driver_stopping: Arc<AtomicBool>,
}

impl<F: DriverFactory> LeaderStateMachine<F> {
    pub fn new(collaborators: Collaborators<F>, config: Config) -> Arc<Self> {
        Arc::new(Self {
            collaborators,
            config,
            leader_flag: LeaderFlag::new(),
            backoff: BackoffController::new(),
            driver_supervisor: AsyncMutex::new(DriverSupervisor::new()),
            ticker: SyncMutex::new(None),
            shutting_down: Arc::new(AtomicBool::new(false)),
            shutdown_notify: Arc::new(Notify::new()),
            driver_stopping: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn leader_flag(&self) -> &LeaderFlag {
        &self.leader_flag
    }

    pub fn backoff(&self) -> &BackoffController {
        &self.backoff
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Idle → Offering: offer candidacy after the current backoff elapses.
    /// Called at startup and every time a prior epoch ends without
    /// shutdown in progress.
    pub async fn offer(self: &Arc<Self>) {
        if self.is_shutting_down() {
            return;
        }
        let delay = self.backoff.current();
        tokio::time::sleep(delay).await;
        if self.is_shutting_down() {
            return;
        }
        let listener: Arc<dyn LeadershipListener> = Arc::new(ListenerHandle(Arc::clone(self)));
        if let Err(e) = self.collaborators.candidate.offer(listener).await {
            tracing::warn!(error = %e, "candidacy offer failed");
        }
    }

    /// Run the elected-preparation sequence. On success, activates. On
    /// failure, increases backoff and runs the hook if the driver never
    /// took ownership of it.
    async fn prepare_and_activate(self: &Arc<Self>, hook: AbdicationHook) -> LeaderResult<()> {
        if let Err(e) = self.collaborators.migration.migrate().await {
            self.fail_preparation(hook).await;
            return Err(LeaderError::MigrationFailed(e.to_string()));
        }

        let timeout = self.config.on_elected_prepare_timeout();
        match tokio::time::timeout(timeout, self.collaborators.callbacks.run_elected()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.fail_preparation(hook).await;
                return Err(LeaderError::CallbackFailed(e.to_string()));
            }
            Err(_) => {
                self.fail_preparation(hook).await;
                return Err(LeaderError::Timeout(timeout));
            }
        }

        let timeout = self.config.max_actor_startup_time();
        match tokio::time::timeout(timeout, self.collaborators.coordinator.prepare_for_start()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.fail_preparation(hook).await;
                return Err(LeaderError::CoordinatorPrepareFailed(e.to_string()));
            }
            Err(_) => {
                self.fail_preparation(hook).await;
                return Err(LeaderError::Timeout(timeout));
            }
        }

        let driver = match self.collaborators.driver_factory.create_driver().await {
            Ok(driver) => driver,
            Err(e) => {
                self.fail_preparation(hook).await;
                return Err(LeaderError::DriverConstructionFailed(e.to_string()));
            }
        };

        self.activate(driver, hook).await;
        Ok(())
    }

    /// Preparation failed before the driver took ownership of the hook:
    /// run it ourselves and increase backoff.
    async fn fail_preparation(&self, hook: AbdicationHook) {
        self.backoff.increase();
        hook.run().await;
    }

    async fn activate(self: &Arc<Self>, driver: F::Driver, hook: AbdicationHook) {
        let driver_handle = self.driver_supervisor.lock().await.install(driver);
        self.leader_flag.set(true);
        // Fresh epoch: a stale `true` left over from the previous epoch
        // must not suppress this epoch's own spontaneous-exit handling.
        self.driver_stopping.store(false, Ordering::Release);

        let ticker = PeriodicTicker::spawn(
            TickerConfig {
                scale_apps_initial_delay: self.config.scale_apps_initial_delay(),
                scale_apps_interval: self.config.scale_apps_interval(),
                reconciliation_initial_delay: self.config.reconciliation_initial_delay(),
                reconciliation_interval: self.config.reconciliation_interval(),
            },
            self.leader_flag.reader(),
            self.collaborators.scheduler_actor.clone(),
            Arc::clone(&self.collaborators.task_tracker),
            Arc::clone(&self.collaborators.app_repository),
        );
        *self.ticker.lock() = Some(ticker);

        self.collaborators.event_bus.publish(LeadershipEvent::ElectedAsLeader);
        self.backoff.reset();
        tracing::info!("activated: driver running, ticker armed");

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = driver_handle.run().await;
            this.on_driver_exit(result, hook).await;
        });
    }

    /// Driver-exit handler: runs on the dedicated driver worker task.
    ///
    /// Takes ownership of the abdication hook, but only runs it — and only
    /// re-offers — when the driver exited spontaneously (crash, loss of
    /// mastership upstream). When `on_defeated`/`trigger_shutdown` already
    /// initiated this stop, `driver_stopping` is set, and that path already
    /// owns (or deliberately skips) the hook and the one re-offer for this
    /// epoch's end; running either here too would abdicate/re-offer twice
    /// for a single `onDefeated`.
    async fn on_driver_exit(self: Arc<Self>, result: Result<(), ms_driver::DriverError>, hook: AbdicationHook) {
        match result {
            Ok(()) => tracing::info!("driver exited cleanly"),
            Err(e) => tracing::warn!(error = %e, "driver exited abnormally"),
        }

        if self.driver_stopping.swap(false, Ordering::AcqRel) {
            tracing::debug!(
                "driver exit was defeat/shutdown-initiated, leaving hook and re-offer to that path"
            );
            return;
        }

        hook.run().await;
        self.ticker.lock().take();
        self.driver_supervisor.lock().await.clear();
        self.leader_flag.set(false);

        if !self.is_shutting_down() {
            tracing::info!("re-offering candidacy after driver exit");
            self.offer().await;
        }
    }

    /// Active → Defeating → Offering: stop ticker, stop driver, clear
    /// task-tracker, set flag false, publish Standby, then re-offer
    /// unless shutdown is underway.
    ///
    /// We have already lost candidacy by the time the coordination service
    /// calls `onDefeated`, so the abdication hook must not run here (or in
    /// the driver-exit handler this unblocks) — running it would force a
    /// release of whatever another replica may already hold. `offer()` is
    /// the only re-offer for this epoch; `driver_stopping` suppresses the
    /// driver-exit handler's own.
    async fn on_defeated(self: Arc<Self>) {
        self.ticker.lock().take();
        self.driver_stopping.store(true, Ordering::Release);
        self.driver_supervisor.lock().await.stop().await;
        self.collaborators.task_tracker.clear();
        self.collaborators.callbacks.run_defeated().await;
        self.leader_flag.set(false);
        self.collaborators.event_bus.publish(LeadershipEvent::Standby);
        self.collaborators.coordinator.stop().await;

        if !self.is_shutting_down() {
            self.offer().await;
        }
    }

    /// Any state → Stopped: idempotent. Sets `LeaderFlag` false, stops the
    /// driver, cancels the ticker, releases the shutdown latch exactly
    /// once. `driver_stopping` keeps the driver-exit handler this unblocks
    /// from abdicating or re-offering once shutdown is already underway —
    /// this path itself owns clearing `LeaderFlag` and the ticker now that
    /// the driver-exit handler defers to it.
    pub async fn trigger_shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.leader_flag.set(false);
        self.ticker.lock().take();
        self.driver_stopping.store(true, Ordering::Release);
        self.driver_supervisor.lock().await.stop().await;
        self.shutdown_notify.notify_waiters();
    }

    pub async fn wait_for_shutdown(&self) {
        if self.is_shutting_down() {
            return;
        }
        self.shutdown_notify.notified().await;
    }
}

/// Adapts a `LeaderStateMachine<F>` to the `LeadershipListener` contract,
/// holding the `Arc` the state machine needs to keep driving itself
/// across the awaited preparation sequence and any re-offer.
struct ListenerHandle<F: DriverFactory>(Arc<LeaderStateMachine<F>>);

#[async_trait]
impl<F: DriverFactory> LeadershipListener for ListenerHandle<F> {
    async fn on_elected(&self, hook: AbdicationHook) {
        if let Err(reason) = self.0.prepare_and_activate(hook).await {
            tracing::warn!(reason = %reason, "elected-preparation failed, abdicating");
            self.0.offer().await;
        }
    }

    async fn on_defeated(&self) {
        Arc::clone(&self.0).on_defeated().await;
    }
}
