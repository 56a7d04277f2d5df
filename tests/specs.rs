// SPDX-License-Identifier: MIT

//! Cross-crate scenarios for the leader-lifecycle core, driven entirely
//! through the public surface (`ServiceLifecycleShell`, `Collaborators`,
//! the coordination/driver fakes) rather than any crate's internals.

use ms_adapters::{
    spawn_scheduler_actor, CallbackRegistry, EventBus, InMemoryAppRepository, NotifyCoordinator, NullMigration,
    TaskTracker,
};
use ms_coordination::{Candidate, CandidacyAdapter, FakeCandidate, SoloCandidate};
use ms_core::Config;
use ms_driver::FakeDriverFactory;
use ms_leader::{Collaborators, LeaderStateMachine, ServiceLifecycleShell};
use std::sync::Arc;
use std::time::Duration;

fn collaborators(
    candidate: Arc<dyn Candidate>,
    driver_factory: FakeDriverFactory,
) -> Collaborators<FakeDriverFactory> {
    let (actor, _task) = spawn_scheduler_actor();
    Collaborators {
        candidate: CandidacyAdapter::new(candidate),
        driver_factory,
        migration: Arc::new(NullMigration),
        callbacks: Arc::new(CallbackRegistry::new(vec![], Duration::from_secs(1))),
        coordinator: Arc::new(NotifyCoordinator::new().also_ready()),
        event_bus: EventBus::new(),
        scheduler_actor: actor,
        task_tracker: Arc::new(TaskTracker::new()),
        app_repository: Arc::new(InMemoryAppRepository::new()),
    }
}

fn shell(candidate: Arc<dyn Candidate>, driver_factory: FakeDriverFactory) -> ServiceLifecycleShell<FakeDriverFactory> {
    let state_machine = LeaderStateMachine::new(collaborators(candidate, driver_factory), Config::default());
    ServiceLifecycleShell::new(state_machine)
}

/// S1: a solo replica with no coordination service elects itself on the
/// very first offer and starts its driver.
#[tokio::test]
async fn s1_solo_cold_start_elects_and_activates() {
    let mut shell = shell(Arc::new(SoloCandidate::new()), FakeDriverFactory::new());
    shell.start_up();
    let sm = Arc::clone(shell.state_machine());

    let runner = tokio::spawn(async move { shell.run().await });
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert!(sm.leader_flag().is_leader());
    sm.trigger_shutdown().await;
    tokio::time::timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
}

/// S2: an HA replica only activates once the coordination service actually
/// elects it, not merely from registering candidacy.
#[tokio::test]
async fn s2_ha_replica_only_activates_on_election() {
    let candidate = Arc::new(FakeCandidate::new());
    let mut shell = shell(Arc::clone(&candidate) as Arc<dyn Candidate>, FakeDriverFactory::new());
    shell.start_up();
    let sm = Arc::clone(shell.state_machine());

    let runner = tokio::spawn(async move { shell.run().await });
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(!sm.leader_flag().is_leader(), "candidacy alone must not elect");

    candidate.elect().await;
    assert!(sm.leader_flag().is_leader());

    sm.trigger_shutdown().await;
    tokio::time::timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
}

/// S3: when the elected-preparation sequence fails, the driver is never
/// constructed, the abdication hook still runs exactly once, and backoff
/// increases before the replica re-offers.
#[tokio::test]
async fn s3_preparation_failure_abdicates_and_backs_off() {
    use ms_adapters::Migration;
    use async_trait::async_trait;

    struct AlwaysFailsMigration;
    #[async_trait]
    impl Migration for AlwaysFailsMigration {
        async fn migrate(&self) -> Result<(), ms_adapters::MigrationError> {
            Err(ms_adapters::MigrationError::Failed("simulated startup failure".to_string()))
        }
    }

    let candidate = Arc::new(FakeCandidate::new());
    let driver_factory = FakeDriverFactory::new();
    let mut collaborators = collaborators(Arc::clone(&candidate) as Arc<dyn Candidate>, driver_factory.clone());
    collaborators.migration = Arc::new(AlwaysFailsMigration);
    let state_machine = LeaderStateMachine::new(collaborators, Config::default());
    let mut shell = ServiceLifecycleShell::new(state_machine);
    shell.start_up();
    let sm = Arc::clone(shell.state_machine());

    let runner = tokio::spawn(async move { shell.run().await });
    // the initial offer() sleeps the current (500ms) backoff before it
    // registers candidacy with the fake; wait past that before electing.
    tokio::time::sleep(Duration::from_millis(600)).await;
    candidate.elect().await;

    assert_eq!(driver_factory.created_count(), 0);
    assert!(!sm.leader_flag().is_leader());
    assert_eq!(sm.backoff().current(), Duration::from_secs(1));

    sm.trigger_shutdown().await;
    tokio::time::timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
}

/// S4: defeat while active stops the driver and drops the leader flag,
/// then re-offers candidacy for the next epoch.
#[tokio::test]
async fn s4_defeat_while_active_relinquishes_and_re_offers() {
    let candidate = Arc::new(FakeCandidate::new());
    let mut shell = shell(Arc::clone(&candidate) as Arc<dyn Candidate>, FakeDriverFactory::new());
    shell.start_up();
    let sm = Arc::clone(shell.state_machine());

    let runner = tokio::spawn(async move { shell.run().await });
    tokio::time::sleep(Duration::from_millis(600)).await;
    candidate.elect().await;
    assert!(sm.leader_flag().is_leader());

    candidate.defeat().await;
    assert!(!sm.leader_flag().is_leader());
    assert_eq!(candidate.offer_count(), 2, "defeat re-offers candidacy for the next epoch");

    sm.trigger_shutdown().await;
    tokio::time::timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
}

/// S5: an unexpected driver exit (crash) relinquishes leadership and
/// re-offers candidacy without touching backoff — it is not a preparation
/// failure.
#[tokio::test]
async fn s5_driver_crash_re_offers_without_backoff_penalty() {
    let candidate = Arc::new(FakeCandidate::new());
    let (driver_factory, force_exit) = FakeDriverFactory::with_shared_force_exit();
    let mut shell = shell(Arc::clone(&candidate) as Arc<dyn Candidate>, driver_factory);
    shell.start_up();
    let sm = Arc::clone(shell.state_machine());

    let runner = tokio::spawn(async move { shell.run().await });
    tokio::time::sleep(Duration::from_millis(600)).await;
    candidate.elect().await;
    assert!(sm.leader_flag().is_leader());

    force_exit.notify_one();
    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(!sm.leader_flag().is_leader());
    assert_eq!(sm.backoff().current(), Duration::from_millis(500));
    assert_eq!(candidate.hook_run_count(), 1);

    sm.trigger_shutdown().await;
    tokio::time::timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
}

/// S6: repeated preparation failures double the re-offer delay up to (and,
/// per the documented inclusive-ceiling quirk, one step past) the 16s
/// ceiling, and a subsequent successful election resets it.
#[tokio::test]
async fn s6_repeated_failures_back_off_then_reset_on_success() {
    use ms_adapters::Migration;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyMigration {
        remaining_failures: Arc<AtomicUsize>,
    }
    #[async_trait]
    impl Migration for FlakyMigration {
        async fn migrate(&self) -> Result<(), ms_adapters::MigrationError> {
            if self.remaining_failures.fetch_sub(1, Ordering::SeqCst) > 0 {
                Err(ms_adapters::MigrationError::Failed("not yet".to_string()))
            } else {
                Ok(())
            }
        }
    }

    let candidate = Arc::new(FakeCandidate::new());
    let driver_factory = FakeDriverFactory::new();
    let remaining_failures = Arc::new(AtomicUsize::new(2));
    let mut collaborators = collaborators(Arc::clone(&candidate) as Arc<dyn Candidate>, driver_factory.clone());
    collaborators.migration = Arc::new(FlakyMigration { remaining_failures });
    let state_machine = LeaderStateMachine::new(collaborators, Config::default());
    let mut shell = ServiceLifecycleShell::new(state_machine);
    shell.start_up();
    let sm = Arc::clone(shell.state_machine());

    let runner = tokio::spawn(async move { shell.run().await });
    tokio::time::sleep(Duration::from_millis(600)).await;

    // each failing attempt's re-offer sleeps for the just-doubled backoff
    // before returning, so the assertion after each `elect()` reflects the
    // value *after* that attempt's own failure already doubled it.
    candidate.elect().await; // 1st failure: 500ms -> 1s, re-offer sleeps 1s
    assert_eq!(sm.backoff().current(), Duration::from_secs(1));
    candidate.elect().await; // 2nd failure: 1s -> 2s, re-offer sleeps 2s
    assert_eq!(sm.backoff().current(), Duration::from_secs(2));

    candidate.elect().await; // 3rd attempt: migration now succeeds
    assert!(sm.leader_flag().is_leader(), "the third attempt has no migration failure left and activates");
    assert_eq!(sm.backoff().current(), Duration::from_millis(500), "a successful activation resets backoff to the floor");
    assert_eq!(driver_factory.created_count(), 1);

    sm.trigger_shutdown().await;
    tokio::time::timeout(Duration::from_secs(1), runner).await.unwrap().unwrap();
}
