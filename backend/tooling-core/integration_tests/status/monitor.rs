use crate::helpers::{FakeAdmin, closed_port, eventually, fast_config, local_instance, occupied_port};

use tooling_core::manager::ToolingManager;
use tooling_core::status::check::StatusCheck;
use tooling_core::status::listener::StatusListener;

use models::{ServerState, ServerStatus};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
struct CountingListener {
    calls: AtomicUsize,
}

impl StatusListener for CountingListener {
    fn current_state(&self, _instance: &str, _check: &StatusCheck) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn manager() -> ToolingManager {
    ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("Payara Server 6.2024.6")))
        .build()
        .unwrap()
}

#[tokio::test]
async fn given_open_port_answering_version_when_monitored_then_online_and_running() {
    let (_listener, port) = occupied_port();
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), port))
        .unwrap();

    let status = manager.status("payara6").await.unwrap();

    assert_eq!(status, ServerStatus::Online);
    assert_eq!(manager.state("payara6").unwrap(), ServerState::Running);
    manager.shutdown();
}

#[tokio::test]
async fn given_closed_port_when_monitored_then_offline_and_stopped() {
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();

    let status = manager.status("payara6").await.unwrap();

    assert_eq!(status, ServerStatus::Offline);
    assert_eq!(manager.state("payara6").unwrap(), ServerState::Stopped);
    manager.shutdown();
}

/// **VALUE**: Verifies one-shot listeners fire once and are unregistered afterwards.
///
/// **BUG THIS CATCHES**: Would catch a waiter left in the list after it fired, leaking one
/// registration per lifecycle command for as long as the instance is polled.
#[tokio::test]
async fn given_one_shot_listener_when_status_matches_repeatedly_then_fired_once() {
    // GIVEN: A monitored offline instance with a one-shot OFFLINE listener
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    manager.status("payara6").await.unwrap();
    let monitor = manager.monitor();
    let baseline = monitor.listener_count("payara6");
    let listener = Arc::new(CountingListener::default());

    // WHEN: Several polls report OFFLINE
    monitor
        .add_listener("payara6", listener.clone(), true, &[ServerStatus::Offline])
        .unwrap();
    assert!(eventually(Duration::from_secs(2), || listener.calls.load(Ordering::SeqCst) > 0).await);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // THEN: Called exactly once and gone from the registry
    assert_eq!(listener.calls.load(Ordering::SeqCst), 1);
    assert_eq!(monitor.listener_count("payara6"), baseline);
    manager.shutdown();
}

#[tokio::test]
async fn given_permanent_listener_when_removed_then_no_longer_called() {
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    manager.status("payara6").await.unwrap();
    let monitor = manager.monitor();
    let listener = Arc::new(CountingListener::default());

    let id = monitor
        .add_listener("payara6", listener.clone(), false, &ServerStatus::ALL)
        .unwrap();
    assert!(eventually(Duration::from_secs(2), || listener.calls.load(Ordering::SeqCst) >= 2).await);
    assert!(monitor.remove_listener("payara6", id));
    let after_removal = listener.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(listener.calls.load(Ordering::SeqCst) <= after_removal + 1);
    assert!(!monitor.remove_listener("payara6", id));
    manager.shutdown();
}

#[tokio::test]
async fn given_unmonitored_instance_when_listener_added_then_error() {
    let manager = manager();

    let result = manager.monitor().add_listener(
        "payara6",
        Arc::new(CountingListener::default()),
        true,
        &[ServerStatus::Online],
    );

    assert!(result.is_err());
    assert_eq!(manager.monitor().status("payara6"), ServerStatus::Unknown);
}

#[tokio::test]
async fn given_monitored_instance_when_unmonitored_then_status_unknown() {
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    manager.status("payara6").await.unwrap();

    assert!(manager.monitor().unmonitor("payara6"));

    assert!(!manager.monitor().is_monitored("payara6"));
    assert_eq!(manager.monitor().status("payara6"), ServerStatus::Unknown);
    assert!(!manager.monitor().unmonitor("payara6"));
}

#[tokio::test]
async fn given_unmonitored_instance_when_get_status_then_error() {
    let manager = manager();

    let result = manager
        .monitor()
        .get_status("payara6", Duration::from_millis(50))
        .await;

    assert!(result.is_err());
    manager.shutdown();
}

#[tokio::test]
async fn given_monitored_instance_when_get_status_then_latest_classification() {
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    manager.status("payara6").await.unwrap();

    let status = manager
        .monitor()
        .get_status("payara6", Duration::from_millis(50))
        .await
        .unwrap();

    assert_eq!(status, ServerStatus::Offline);
    manager.shutdown();
}

/// **VALUE**: Verifies a poll result that changes the state is broadcast to subscribers.
///
/// **WHY THIS MATTERS**: Front ends redraw from the state channel instead of polling
/// every instance themselves.
///
/// **BUG THIS CATCHES**: Would catch a state update that skips the broadcast, or one
/// sent before the state lock is released with a stale `old` value.
#[tokio::test]
async fn given_state_subscriber_when_first_poll_completes_then_change_received() {
    // GIVEN: A subscriber attached before the instance is monitored
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    let mut changes = manager.subscribe_state();

    // WHEN: The first poll classifies the instance
    manager.status("payara6").await.unwrap();

    // THEN: UNKNOWN -> STOPPED is broadcast
    let change = tokio::time::timeout(Duration::from_secs(2), changes.recv())
        .await
        .expect("state change within timeout")
        .unwrap();
    assert_eq!(change.instance, "payara6");
    assert_eq!(change.old, ServerState::Unknown);
    assert_eq!(change.new, ServerState::Stopped);
    manager.shutdown();
}
