use crate::helpers::{CountingLauncher, FakeAdmin, Recorder, closed_port, fast_config, local_instance};

use tooling_core::lifecycle::task::TaskListener;
use tooling_core::manager::ToolingManager;

use models::{TaskEvent, TaskState};

use std::sync::Arc;

fn manager() -> ToolingManager {
    ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .with_launcher(Arc::new(CountingLauncher::default()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn given_no_tracked_process_when_killed_then_process_not_exists() {
    // GIVEN: A registered instance nobody launched
    let domains = tempfile::tempdir().unwrap();
    let manager = manager();
    manager
        .register(local_instance("payara6", domains.path(), closed_port()))
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    // WHEN: Killing it
    let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
    let state = manager.kill("payara6", &listeners).unwrap().wait().await;

    // THEN: ProcessNotExists
    assert_eq!(state, TaskState::Failed);
    assert_eq!(recorder.last().map(|e| e.1), Some(TaskEvent::ProcessNotExists));
    manager.shutdown();
}

#[cfg(unix)]
mod unix {
    use super::manager;

    use crate::helpers::{Recorder, closed_port, eventually, local_instance};

    use tooling_core::lifecycle::task::TaskListener;
    use tooling_core::process::ServerProcess;

    use models::{TaskEvent, TaskState};

    use std::sync::Arc;
    use std::time::Duration;

    use tokio::process::Command;

    /// **VALUE**: Verifies killing an already exited process reports it and forgets it.
    ///
    /// **BUG THIS CATCHES**: Would catch a stale handle being kept after the JVM crashed,
    /// making every later kill claim to succeed against nothing.
    #[tokio::test]
    async fn given_exited_process_when_killed_then_process_not_running() {
        // GIVEN: An instance tracking a process that already exited
        let domains = tempfile::tempdir().unwrap();
        let manager = manager();
        let instance = manager
            .register(local_instance("payara6", domains.path(), closed_port()))
            .unwrap();
        let child = Command::new("sh").args(["-c", "exit 0"]).spawn().unwrap();
        let process = Arc::new(ServerProcess::from_child(child));
        instance.set_process(Arc::clone(&process));
        assert!(eventually(Duration::from_secs(5), || !process.is_running()).await);
        let recorder = Arc::new(Recorder::default());

        // WHEN: Killing it
        let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
        let state = manager.kill("payara6", &listeners).unwrap().wait().await;

        // THEN: ProcessNotRunning and the handle is gone
        assert_eq!(state, TaskState::Failed);
        assert_eq!(recorder.last().map(|e| e.1), Some(TaskEvent::ProcessNotRunning));
        assert!(instance.process().is_none());
        manager.shutdown();
    }

    #[tokio::test]
    async fn given_running_process_when_killed_then_completed_and_process_gone() {
        let domains = tempfile::tempdir().unwrap();
        let manager = manager();
        let instance = manager
            .register(local_instance("payara6", domains.path(), closed_port()))
            .unwrap();
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let process = Arc::new(ServerProcess::from_child(child));
        instance.set_process(Arc::clone(&process));
        let recorder = Arc::new(Recorder::default());

        let listeners: Vec<Arc<dyn TaskListener>> = vec![recorder.clone()];
        let state = manager.kill("payara6", &listeners).unwrap().wait().await;

        assert_eq!(state, TaskState::Completed);
        assert_eq!(recorder.last().map(|e| e.1), Some(TaskEvent::CmdCompleted));
        assert!(!process.is_running());
        assert!(instance.process().is_none());
        manager.shutdown();
    }
}
