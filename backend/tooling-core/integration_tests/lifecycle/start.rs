use crate::helpers::{
    CountingLauncher, FakeAdmin, Recorder, VersionAnswer, closed_port, fast_config,
    local_instance, occupied_port,
};

use tooling_core::lifecycle::task::TaskListener;
use tooling_core::manager::ToolingManager;

use models::{ServerState, TaskEvent, TaskState};

use std::sync::Arc;
use std::sync::atomic::Ordering;

fn manager(admin: Arc<FakeAdmin>, launcher: Arc<CountingLauncher>) -> ToolingManager {
    ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(admin)
        .with_launcher(launcher)
        .build()
        .expect("manager builds")
}

/// **VALUE**: Verifies starting a server that is already online completes without launching.
///
/// **BUG THIS CATCHES**: Would catch a second JVM being spawned against a running domain,
/// which fails on the port bind and leaves an orphaned process behind.
#[tokio::test]
async fn given_online_server_when_started_then_completed_without_launch() {
    // GIVEN: A listener on the admin port that reports a version
    let (_listener, port) = occupied_port();
    let domains = tempfile::tempdir().unwrap();
    let launcher = Arc::new(CountingLauncher::default());
    let manager = manager(Arc::new(FakeAdmin::reporting("Payara Server 6.2024.6")), launcher.clone());
    manager
        .register(local_instance("payara6", domains.path(), port))
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    // WHEN: Starting it
    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.start("payara6", &listeners).unwrap().wait().await;

    // THEN: Completed, nothing launched, state RUNNING
    assert_eq!(state, TaskState::Completed);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    let events = recorder.events();
    assert_eq!(events.first().map(|e| e.0), Some(TaskState::Running));
    assert_eq!(
        recorder.last().map(|e| (e.0, e.1)),
        Some((TaskState::Completed, TaskEvent::CmdCompleted))
    );
    assert_eq!(manager.state("payara6").unwrap(), ServerState::Running);
    manager.shutdown();
}

/// **VALUE**: Verifies a foreign server on the admin port fails the start.
///
/// **WHY THIS MATTERS**: Two installations configured with the same admin port are a common
/// setup mistake; reporting success would make the user debug the wrong server.
#[tokio::test]
async fn given_other_version_on_admin_port_when_started_then_cmd_failed() {
    // GIVEN: Port held by a 5.x server while 6.x is expected
    let (_listener, port) = occupied_port();
    let domains = tempfile::tempdir().unwrap();
    let launcher = Arc::new(CountingLauncher::default());
    let manager = manager(Arc::new(FakeAdmin::reporting("Payara Server 5.2022.5")), launcher.clone());
    let mut descriptor = local_instance("payara6", domains.path(), port);
    descriptor.version = Some(String::from("6.2024.6"));
    manager.register(descriptor).unwrap();
    let recorder = Arc::new(Recorder::default());

    // WHEN: Starting it
    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.start("payara6", &listeners).unwrap().wait().await;

    // THEN: Failed with CmdFailed, the message names the other server, nothing launched
    assert_eq!(state, TaskState::Failed);
    let (last_state, last_event, message) = recorder.last().unwrap();
    assert_eq!(last_state, TaskState::Failed);
    assert_eq!(last_event, TaskEvent::CmdFailed);
    assert!(message.contains("5.2022.5"), "{message}");
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    manager.shutdown();
}

#[tokio::test]
async fn given_port_held_by_server_rejecting_credentials_when_started_then_auth_event() {
    let (_listener, port) = occupied_port();
    let domains = tempfile::tempdir().unwrap();
    let manager = manager(
        Arc::new(FakeAdmin::new(VersionAnswer::RejectsCredentials)),
        Arc::new(CountingLauncher::default()),
    );
    manager
        .register(local_instance("payara6", domains.path(), port))
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.start("payara6", &listeners).unwrap().wait().await;

    assert_eq!(state, TaskState::Failed);
    assert_eq!(recorder.last().map(|e| e.1), Some(TaskEvent::AuthFailedHttp));
    manager.shutdown();
}

#[tokio::test]
async fn given_offline_server_when_launch_fails_then_exception() {
    let domains = tempfile::tempdir().unwrap();
    let launcher = Arc::new(CountingLauncher::default());
    let manager = manager(Arc::new(FakeAdmin::reporting("6.2024.6")), launcher.clone());
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.start("payara6", &listeners).unwrap().wait().await;

    assert_eq!(state, TaskState::Failed);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.last().map(|e| e.1), Some(TaskEvent::Exception));
    manager.shutdown();
}

#[tokio::test]
async fn given_unknown_instance_when_started_then_not_found_error() {
    let manager = manager(
        Arc::new(FakeAdmin::reporting("6.2024.6")),
        Arc::new(CountingLauncher::default()),
    );

    assert!(manager.start("ghost", &[]).is_err());
}

#[cfg(unix)]
mod profile {
    use crate::helpers::{FakeAdmin, Recorder, closed_port, fast_config, local_instance};

    use tooling_core::error::process::ProcessError;
    use tooling_core::lifecycle::task::TaskListener;
    use tooling_core::manager::ToolingManager;
    use tooling_core::process::ServerProcess;
    use tooling_core::process::launch::ProcessLauncher;

    use models::{JvmMode, ServerInstance, ServerState, TaskEvent, TaskState};

    use std::sync::Arc;

    use tokio::process::Command;

    struct SleepLauncher;

    impl ProcessLauncher for SleepLauncher {
        fn launch(&self, _instance: &ServerInstance) -> Result<ServerProcess, ProcessError> {
            let child = Command::new("sleep").arg("30").spawn().unwrap();
            Ok(ServerProcess::from_child(child))
        }
    }

    /// **VALUE**: Verifies a profile-mode start ends once the JVM is up and parks the state.
    ///
    /// **WHY THIS MATTERS**: A profiled JVM does not open its admin port until a profiler
    /// attaches, so waiting for ONLINE would always time out.
    ///
    /// **BUG THIS CATCHES**: Would catch the completion notification overwriting
    /// STOPPED_JVM_PROFILER with RUNNING.
    #[tokio::test]
    async fn given_profile_mode_when_started_then_completed_and_waiting_for_profiler() {
        // GIVEN: A local profile-mode instance with a free admin port
        let domains = tempfile::tempdir().unwrap();
        let manager = ToolingManager::builder()
            .with_config(fast_config())
            .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
            .with_launcher(Arc::new(SleepLauncher))
            .build()
            .unwrap();
        let mut descriptor = local_instance("payara6", domains.path(), closed_port());
        descriptor.jvm_mode = JvmMode::Profile;
        manager.register(descriptor).unwrap();
        let recorder = Arc::new(Recorder::default());

        // WHEN: Starting it
        let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
        let state = manager.start("payara6", &listeners).unwrap().wait().await;

        // THEN: Completed while the instance waits for the profiler
        assert_eq!(state, TaskState::Completed);
        let (_, event, message) = recorder.last().unwrap();
        assert_eq!(event, TaskEvent::CmdCompleted);
        assert!(message.contains("profile mode"), "message: {message}");
        assert_eq!(manager.state("payara6").unwrap(), ServerState::StoppedJvmProfiler);

        let process = manager.instance("payara6").unwrap().take_process().unwrap();
        process.kill().await.unwrap();
        manager.shutdown();
    }
}
