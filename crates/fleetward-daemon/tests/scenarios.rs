//! Coverage for the concrete scenarios and invariants in the worker-instance
//! lifecycle manager's testable-properties section, using a test clock and
//! a mock cloud adapter so nothing here depends on wall-clock sleeps.

use fleetward_cloud::mock::MockCloudAdapter;
use fleetward_cloud::PowerState;
use fleetward_core::clock::TestClock;
use fleetward_core::config::Configuration;
use fleetward_core::role::Role;
use fleetward_daemon::{Instance, WorkerRegistry};
use std::sync::Arc;
use std::time::Duration;

fn defaults() -> Configuration {
    Configuration::with_defaults(Role::Master)
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Scenario 1 + 2: stuck-in-PENDING reboot, then reboot cooldown.
#[tokio::test]
async fn stuck_in_pending_reboots_then_respects_cooldown() {
    let clock = Arc::new(TestClock::new());
    let cloud = Arc::new(MockCloudAdapter::new());
    cloud.set_state("i-1", PowerState::Pending);

    let registry = WorkerRegistry::new();
    let instance = Instance::new("i-1", defaults(), clock.clone(), cloud.clone());
    registry.insert(instance.clone());

    clock.set_offset(secs(0));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 0, "t=0 seeds last_m_state_change, no reboot yet");

    clock.set_offset(secs(100));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 0, "t=100 is short of the 400s state-change grace");

    clock.set_offset(secs(600));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 1, "t=600 clears the grace and reboot cooldown");

    // Scenario 2: reboot cooldown after the first reboot.
    clock.set_offset(secs(700));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 1, "t=700 is within the 300s reboot cooldown");

    clock.set_offset(secs(900));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 2, "t=900 clears the cooldown since the t=600 reboot");
}

/// Scenario 3: overriding `instance_reboot_timeout` changes reboot cadence.
#[tokio::test]
async fn overridden_reboot_timeout_changes_cadence() {
    let mut config = defaults();
    config.instance_reboot_timeout = secs(500);

    let clock = Arc::new(TestClock::new());
    let cloud = Arc::new(MockCloudAdapter::new());
    cloud.set_state("i-1", PowerState::Pending);

    let registry = WorkerRegistry::new();
    let instance = Instance::new("i-1", config, clock.clone(), cloud.clone());
    registry.insert(instance.clone());

    clock.set_offset(secs(0));
    instance.maintain(&registry).await;

    clock.set_offset(secs(500));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 1);

    clock.set_offset(secs(700));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 1, "700-500=200 < 500s cooldown");

    clock.set_offset(secs(900));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 1, "900-500=400 < 500s cooldown");

    clock.set_offset(secs(1200));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 2, "1200-500=700 >= 500s cooldown");
}

/// Scenario 4: ERROR reboots immediately, with no state-change grace.
#[tokio::test]
async fn error_state_skips_state_change_grace() {
    let clock = Arc::new(TestClock::new());
    let cloud = Arc::new(MockCloudAdapter::new());
    cloud.set_state("i-1", PowerState::Error);

    let registry = WorkerRegistry::new();
    let instance = Instance::new("i-1", defaults(), clock.clone(), cloud.clone());
    registry.insert(instance.clone());

    clock.set_offset(secs(0));
    instance.maintain(&registry).await;

    assert_eq!(instance.reboot_count(), 1, "ERROR reboots on the very first tick");
}

/// Scenario 5: a silent RUNNING instance is rebooted once its comm timeout
/// is exceeded.
#[tokio::test]
async fn silent_running_instance_is_rebooted() {
    let clock = Arc::new(TestClock::new());
    let cloud = Arc::new(MockCloudAdapter::new());
    cloud.set_state("i-1", PowerState::Running);

    let registry = WorkerRegistry::new();
    let instance = Instance::new("i-1", defaults(), clock.clone(), cloud.clone());
    registry.insert(instance.clone());

    clock.set_offset(secs(0));
    instance.handle_message();
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 0, "t=0, comm timeout not yet exceeded");

    clock.set_offset(secs(500));
    instance.maintain(&registry).await;
    assert_eq!(instance.reboot_count(), 1, "t=500 exceeds the 300s comm timeout");
}

/// Scenario 6: reboot budget exhaustion escalates to termination attempts,
/// and termination budget exhaustion drops the instance from the registry.
#[tokio::test]
async fn reboot_budget_exhaustion_escalates_to_termination_then_drop() {
    let clock = Arc::new(TestClock::new());
    let cloud = Arc::new(MockCloudAdapter::new());
    cloud.set_state("i-1", PowerState::Error);
    cloud.set_terminate_result(false);

    let registry = WorkerRegistry::new();
    let instance = Instance::new("i-1", defaults(), clock.clone(), cloud.clone());
    registry.insert(instance.clone());

    // Four reboots, each past the reboot cooldown, accumulate the budget.
    for tick in [0u64, 300, 600, 900] {
        clock.set_offset(secs(tick));
        instance.maintain(&registry).await;
    }
    assert_eq!(instance.reboot_count(), 4);

    // Reboot budget is exhausted: the next four ticks each launch a
    // termination attempt that fails.
    for expected_attempts in 1..=4u32 {
        clock.set_offset(secs(1200 + expected_attempts as u64 * 300));
        let handle = instance
            .maintain(&registry)
            .await
            .expect("reboot budget exhausted should launch a termination attempt");
        handle.await.unwrap();

        assert_eq!(instance.terminate_attempt_count(), expected_attempts);
        assert!(registry.get("i-1").is_some(), "failed termination keeps the instance registered");
        assert!(instance.cloud_handle().is_some(), "failed termination leaves the handle intact");
    }

    // Termination budget is now exhausted too: the instance is dropped with
    // no further termination attempt.
    clock.set_offset(secs(3000));
    let handle = instance.maintain(&registry).await;
    assert!(handle.is_none(), "termination budget exhausted, no task launched");
    assert!(registry.get("i-1").is_none(), "instance is dropped from the registry");
    assert_eq!(instance.terminate_attempt_count(), 4, "no further attempts are made");
}

/// Successful termination nulls the cached handle and removes the instance
/// from the registry.
#[tokio::test]
async fn successful_termination_clears_handle_and_registry() {
    let clock = Arc::new(TestClock::new());
    let cloud = Arc::new(MockCloudAdapter::new());
    cloud.set_state("i-1", PowerState::Running);

    let registry = WorkerRegistry::new();
    let instance = Instance::new("i-1", defaults(), clock.clone(), cloud.clone());
    registry.insert(instance.clone());

    // Populate the cached handle the way maintain() would.
    instance.get_cloud_instance_object(true).await.unwrap();

    instance.terminate(registry.clone()).await.unwrap();

    assert!(instance.cloud_handle().is_none());
    assert!(registry.get("i-1").is_none());
}

/// Round-trip: n reboots increment the counter by exactly n, and
/// handle_message only ever moves last_comm forward.
#[tokio::test]
async fn reboot_and_handle_message_are_well_behaved() {
    let clock = Arc::new(TestClock::new());
    let cloud = Arc::new(MockCloudAdapter::new());
    let instance = Instance::new("i-1", defaults(), clock.clone(), cloud.clone());

    for _ in 0..5 {
        instance.reboot().await;
    }
    assert_eq!(instance.reboot_count(), 5);

    // handle_message never panics or errors when called repeatedly; the
    // only externally observable effect is last_comm moving forward, which
    // manifests in maintain()'s comm-timeout arithmetic elsewhere.
    for _ in 0..3 {
        instance.handle_message();
    }
}
