use crate::helpers::{CountingLauncher, FakeAdmin, Recorder, fast_config, local_instance, occupied_port};

use tooling_core::lifecycle::task::TaskListener;
use tooling_core::manager::ToolingManager;

use models::{ServerState, TaskEvent, TaskState};

use std::sync::Arc;

/// **VALUE**: Verifies a stop sends stop-domain and completes once the port closes.
///
/// **WHY THIS MATTERS**: `stop-domain` returns before the JVM has exited; completing on the
/// command alone would let a following start race the dying server for its ports.
#[tokio::test]
async fn given_online_server_when_stopped_then_completed_after_port_closes() {
    // GIVEN: An online server whose admin closes the port on stop-domain
    let (listener, port) = occupied_port();
    let domains = tempfile::tempdir().unwrap();
    let admin = Arc::new(FakeAdmin::reporting("Payara Server 6.2024.6").holding(listener));
    let manager = ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(admin)
        .with_launcher(Arc::new(CountingLauncher::default()))
        .build()
        .unwrap();
    manager
        .register(local_instance("payara6", domains.path(), port))
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    // WHEN: Stopping it
    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.stop("payara6", &listeners).unwrap().wait().await;

    // THEN: Completed, state STOPPED
    assert_eq!(state, TaskState::Completed);
    assert_eq!(
        recorder.last().map(|e| (e.0, e.1)),
        Some((TaskState::Completed, TaskEvent::CmdCompleted))
    );
    assert_eq!(manager.state("payara6").unwrap(), ServerState::Stopped);
    manager.shutdown();
}

#[tokio::test]
async fn given_offline_server_when_stopped_then_already_stopped() {
    let domains = tempfile::tempdir().unwrap();
    let manager = ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .with_launcher(Arc::new(CountingLauncher::default()))
        .build()
        .unwrap();
    manager
        .register(local_instance("payara6", domains.path(), crate::helpers::closed_port()))
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.stop("payara6", &listeners).unwrap().wait().await;

    assert_eq!(state, TaskState::Completed);
    let (_, _, message) = recorder.last().unwrap();
    assert_eq!(message, "Server payara6 is not running");
    manager.shutdown();
}

/// **VALUE**: Verifies a restart reports the stop half as progress and ends with the start.
///
/// **BUG THIS CATCHES**: Would catch a restart whose listeners see COMPLETED right after the
/// stop and stop listening before the start even begins.
#[tokio::test]
async fn given_online_server_when_restarted_then_single_terminal_event() {
    // GIVEN: An online server; after stop-domain the port is closed and the launcher fails
    let (listener, port) = occupied_port();
    let domains = tempfile::tempdir().unwrap();
    let admin = Arc::new(FakeAdmin::reporting("6.2024.6").holding(listener));
    let manager = ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(admin)
        .with_launcher(Arc::new(CountingLauncher::default()))
        .build()
        .unwrap();
    manager
        .register(local_instance("payara6", domains.path(), port))
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    // WHEN: Restarting
    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.restart("payara6", &listeners).unwrap().wait().await;

    // THEN: Exactly one terminal notification, the launch failure at the end
    let events = recorder.events();
    let terminal = events
        .iter()
        .filter(|(state, _, _)| *state != TaskState::Running)
        .count();
    assert_eq!(terminal, 1, "{events:?}");
    assert_eq!(state, TaskState::Failed);
    assert_eq!(recorder.last().map(|e| e.1), Some(TaskEvent::Exception));
    manager.shutdown();
}
