// SPDX-License-Identifier: MIT

//! Periodic control-loop jobs: scale, reconcile, expunge-orphans. A fresh
//! `PeriodicTicker` is created on every activation and cancelled wholesale
//! on defeat so no job from a prior epoch can fire into the next one.

use ms_adapters::{AppRepository, SchedulerActorHandle, TaskTracker};
use ms_core::{LeaderFlagReader, SchedulerMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct TickerConfig {
    pub scale_apps_initial_delay: Duration,
    pub scale_apps_interval: Duration,
    pub reconciliation_initial_delay: Duration,
    pub reconciliation_interval: Duration,
}

/// Owns the three scheduled jobs for one epoch. Dropping (or calling
/// `cancel`) aborts every underlying task immediately.
pub struct PeriodicTicker {
    scale: JoinHandle<()>,
    reconcile: JoinHandle<()>,
    expunge: JoinHandle<()>,
}

impl PeriodicTicker {
    pub fn spawn(
        config: TickerConfig,
        leader_flag: LeaderFlagReader,
        actor: SchedulerActorHandle,
        task_tracker: Arc<TaskTracker>,
        app_repository: Arc<dyn AppRepository>,
    ) -> Self {
        let scale = tokio::spawn(scale_apps_job(
            config.scale_apps_initial_delay,
            config.scale_apps_interval,
            leader_flag.clone(),
            actor.clone(),
        ));
        let reconcile = tokio::spawn(reconcile_job(
            config.reconciliation_initial_delay,
            config.reconciliation_interval,
            leader_flag.clone(),
            actor.clone(),
        ));
        let expunge = tokio::spawn(expunge_orphans_job(
            config.reconciliation_initial_delay + config.reconciliation_interval,
            leader_flag,
            task_tracker,
            app_repository,
        ));

        Self { scale, reconcile, expunge }
    }

    pub fn cancel(&self) {
        self.scale.abort();
        self.reconcile.abort();
        self.expunge.abort();
    }
}

impl Drop for PeriodicTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn scale_apps_job(
    initial_delay: Duration,
    period: Duration,
    leader_flag: LeaderFlagReader,
    actor: SchedulerActorHandle,
) {
    tokio::time::sleep(initial_delay).await;
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // first tick fires immediately
    loop {
        if leader_flag.is_leader() {
            tracing::debug!("ticker: scale apps");
            actor.send(SchedulerMessage::ScaleApps).await;
        }
        interval.tick().await;
    }
}

async fn reconcile_job(
    initial_delay: Duration,
    period: Duration,
    leader_flag: LeaderFlagReader,
    actor: SchedulerActorHandle,
) {
    tokio::time::sleep(initial_delay).await;
    let mut interval = tokio::time::interval(period);
    interval.tick().await;
    loop {
        if leader_flag.is_leader() {
            tracing::debug!("ticker: reconcile tasks and health checks");
            actor.send(SchedulerMessage::ReconcileTasks).await;
            actor.send(SchedulerMessage::ReconcileHealthChecks).await;
        }
        interval.tick().await;
    }
}

async fn expunge_orphans_job(
    delay: Duration,
    leader_flag: LeaderFlagReader,
    task_tracker: Arc<TaskTracker>,
    app_repository: Arc<dyn AppRepository>,
) {
    tokio::time::sleep(delay).await;
    if leader_flag.is_leader() {
        tracing::debug!("ticker: expunge orphaned tasks");
        let known_apps = app_repository.known_app_ids().await;
        let orphaned = task_tracker.expunge_orphaned_tasks(&known_apps);
        if !orphaned.is_empty() {
            tracing::info!(count = orphaned.len(), "expunged orphaned tasks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_adapters::InMemoryAppRepository;
    use ms_core::LeaderFlag;

    #[tokio::test(start_paused = true)]
    async fn jobs_do_not_fire_before_initial_delay() {
        let flag = LeaderFlag::new();
        flag.set(true);
        let (actor, _task) = ms_adapters::spawn_scheduler_actor();
        let tracker = Arc::new(TaskTracker::new());
        let ticker = PeriodicTicker::spawn(
            TickerConfig {
                scale_apps_initial_delay: Duration::from_secs(5),
                scale_apps_interval: Duration::from_secs(30),
                reconciliation_initial_delay: Duration::from_secs(15),
                reconciliation_interval: Duration::from_secs(30),
            },
            flag.reader(),
            actor,
            tracker,
            Arc::new(InMemoryAppRepository::new()),
        );
        tokio::time::advance(Duration::from_millis(100)).await;
        ticker.cancel();
    }

    #[tokio::test]
    async fn cancel_aborts_all_jobs() {
        let flag = LeaderFlag::new();
        let (actor, _task) = ms_adapters::spawn_scheduler_actor();
        let tracker = Arc::new(TaskTracker::new());
        let ticker = PeriodicTicker::spawn(
            TickerConfig {
                scale_apps_initial_delay: Duration::from_millis(1),
                scale_apps_interval: Duration::from_millis(1),
                reconciliation_initial_delay: Duration::from_millis(1),
                reconciliation_interval: Duration::from_millis(1),
            },
            flag.reader(),
            actor,
            tracker,
            Arc::new(InMemoryAppRepository::new()),
        );
        ticker.cancel();
        assert!(ticker.scale.is_finished());
        assert!(ticker.reconcile.is_finished());
        assert!(ticker.expunge.is_finished());
    }

    #[tokio::test]
    async fn expunge_job_drops_only_tasks_whose_app_is_unknown() {
        use ms_core::{AppDefinition, AppId, TaskId};

        let flag = LeaderFlag::new();
        flag.set(true);
        let (actor, _task) = ms_adapters::spawn_scheduler_actor();
        let tracker = Arc::new(TaskTracker::new());
        let known_app = AppId::new();
        tracker.track(TaskId::new(), known_app);
        let orphan_task = TaskId::new();
        tracker.track(orphan_task.clone(), AppId::new());

        let app_repository = Arc::new(InMemoryAppRepository::new());
        app_repository.put(AppDefinition { id: known_app, version: 1 });

        let ticker = PeriodicTicker::spawn(
            TickerConfig {
                scale_apps_initial_delay: Duration::from_secs(60),
                scale_apps_interval: Duration::from_secs(60),
                reconciliation_initial_delay: Duration::from_millis(1),
                reconciliation_interval: Duration::from_millis(1),
            },
            flag.reader(),
            actor,
            Arc::clone(&tracker),
            app_repository,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        ticker.cancel();

        assert_eq!(tracker.len(), 1, "only the task whose app is unknown is expunged");
        assert!(!tracker.is_known(&orphan_task));
    }
}
