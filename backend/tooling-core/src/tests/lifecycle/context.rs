use super::Recorder;

use crate::admin::{AdminCommand, AdminResult, AdminTarget, ServerAdmin};
use crate::config::{LifecycleConfig, LogConfig, StatusConfig};
use crate::error::process::ProcessError;
use crate::lifecycle::messages::MessageKey;
use crate::lifecycle::task::{Operation, TaskContext};
use crate::log_view::LogViewManager;
use crate::log_view::pipeline::ForwardingSink;
use crate::process::ServerProcess;
use crate::process::launch::ProcessLauncher;
use crate::registry::InstanceRegistry;
use crate::registry::secret::MemorySecretStore;
use crate::status::StatusMonitor;

use common::ErrorLocation;

use models::{ServerInstance, ServerState, TaskEvent, TaskState};

use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

struct SilentAdmin;

#[async_trait]
impl ServerAdmin for SilentAdmin {
    async fn exec(&self, _target: &AdminTarget, _command: AdminCommand) -> AdminResult {
        AdminResult::unreachable("connection refused")
    }
}

struct NoLauncher;

impl ProcessLauncher for NoLauncher {
    fn launch(&self, _instance: &ServerInstance) -> Result<ServerProcess, ProcessError> {
        Err(ProcessError::Configuration {
            message: String::from("launching disabled"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Answers `__locations` with a fixed domain folder.
struct LocationsAdmin(Option<String>);

#[async_trait]
impl ServerAdmin for LocationsAdmin {
    async fn exec(&self, _target: &AdminTarget, command: AdminCommand) -> AdminResult {
        match (command, &self.0) {
            (AdminCommand::Locations, Some(root)) => AdminResult::completed("")
                .with_properties(BTreeMap::from([(String::from("Domain-Root"), root.clone())])),
            _ => AdminResult::failed("not supported"),
        }
    }
}

fn context(operation: Operation, recorder: Arc<Recorder>) -> TaskContext {
    let descriptor = ServerInstance::builder()
        .with_name("remote")
        .with_host("127.0.0.1")
        .with_admin_port(closed_port())
        .build()
        .unwrap();
    context_for(operation, recorder, descriptor, Arc::new(SilentAdmin))
}

fn context_for(
    operation: Operation,
    recorder: Arc<Recorder>,
    descriptor: ServerInstance,
    admin: Arc<dyn ServerAdmin>,
) -> TaskContext {
    let registry = InstanceRegistry::new(Arc::new(MemorySecretStore::new()), broadcast::channel(16).0);
    let instance = registry.register(descriptor).unwrap();

    let status = StatusConfig {
        poll_interval_ms: 50,
        monitor_settle_ms: 2000,
        connect_timeout_ms: 200,
        ..StatusConfig::default()
    };
    let lifecycle = LifecycleConfig {
        wait_tick_ms: 20,
        ..LifecycleConfig::default()
    };

    TaskContext::new(
        operation,
        instance,
        Arc::new(StatusMonitor::new(Arc::clone(&admin), status)),
        admin,
        Arc::new(NoLauncher),
        Arc::new(LogViewManager::new(Arc::new(ForwardingSink), &LogConfig::default())),
        lifecycle,
        Duration::from_millis(200),
    )
    .with_listener(recorder)
}

/// **VALUE**: Verifies intermediate completion is hidden from user listeners only.
///
/// **WHY THIS MATTERS**: During a restart the stop phase completing is not the end of the
/// command; a listener treating it as terminal would report success before the start ran.
#[tokio::test]
async fn given_intermediate_phase_when_completed_then_listener_sees_running() {
    // GIVEN: The stop phase of a restart
    let recorder = Arc::new(Recorder::default());
    let ctx = context(Operation::Restart, Arc::clone(&recorder)).phase(Operation::Stop, true);

    // WHEN: The phase completes
    let returned = ctx.notify(
        TaskState::Completed,
        TaskEvent::CmdCompleted,
        MessageKey::StopCompleted,
        &[],
    );

    // THEN: The task sees Completed, the listener an in-flight update, the state is Stopped
    assert_eq!(returned, TaskState::Completed);
    assert_eq!(
        recorder.events(),
        vec![(
            TaskState::Running,
            TaskEvent::CmdRunning,
            String::from("Server remote stopped")
        )]
    );
    assert_eq!(ctx.instance.state(), ServerState::Stopped);
}

#[tokio::test]
async fn given_final_phase_when_notified_then_name_prepended_to_arguments() {
    let recorder = Arc::new(Recorder::default());
    let ctx = context(Operation::Stop, Arc::clone(&recorder));

    ctx.notify(
        TaskState::Failed,
        TaskEvent::CmdFailed,
        MessageKey::StopCommandFailed,
        &["boom"],
    );

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, TaskState::Failed);
    assert_eq!(events[0].1, TaskEvent::CmdFailed);
    assert_eq!(events[0].2, "Stop command for server remote failed: boom");
    assert_eq!(ctx.instance.state(), ServerState::Unknown);
}

/// **VALUE**: Verifies starting a remote server that is not up fails without launching.
///
/// **BUG THIS CATCHES**: Would catch the tool trying to spawn a JVM for a server it has no
/// local installation of.
#[tokio::test]
async fn given_remote_offline_instance_when_started_then_illegal_state() {
    // GIVEN: A remote instance whose admin port is closed
    let recorder = Arc::new(Recorder::default());
    let ctx = context(Operation::Start, Arc::clone(&recorder));

    // WHEN: Starting it
    let state = ctx.start_sequence().await;

    // THEN: Running then Failed with IllegalState
    assert_eq!(state, TaskState::Failed);
    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].0, TaskState::Running);
    assert_eq!(events[1].1, TaskEvent::IllegalState);
    assert!(events[1].2.contains("remote"));
    ctx.monitor.shutdown();
}

#[tokio::test]
async fn given_unmonitored_instance_when_waiting_for_status_then_not_monitored() {
    let ctx = context(Operation::Stop, Arc::new(Recorder::default()));

    let outcome = ctx
        .wait_for_status(&[models::ServerStatus::Offline], Duration::from_millis(100), None)
        .await;

    assert!(matches!(outcome, crate::lifecycle::task::WaitOutcome::NotMonitored));
}

/// **VALUE**: Verifies an aborted wait leaves no status waiter behind.
///
/// **BUG THIS CATCHES**: Would catch a cancelled lifecycle command leaking its one-shot
/// waiter, which then stays registered for as long as the instance is polled.
#[tokio::test]
async fn given_pending_wait_when_task_aborted_then_waiter_removed() {
    // GIVEN: A monitored instance and a task waiting for a status it never reaches
    let ctx = context(Operation::Start, Arc::new(Recorder::default()));
    ctx.monitor.monitor(&ctx.instance).await.unwrap();
    let baseline = ctx.monitor.listener_count(ctx.name());
    let waiting = ctx.clone();
    let handle = tokio::spawn(async move {
        waiting
            .wait_for_status(&[models::ServerStatus::Online], Duration::from_secs(30), None)
            .await;
    });
    for _ in 0..100 {
        if ctx.monitor.listener_count(ctx.name()) > baseline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(ctx.monitor.listener_count(ctx.name()), baseline + 1);

    // WHEN: The waiting task is aborted
    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());

    // THEN: The waiter is unregistered
    assert_eq!(ctx.monitor.listener_count(ctx.name()), baseline);
    ctx.monitor.shutdown();
}

fn local_descriptor(domains: &std::path::Path) -> ServerInstance {
    ServerInstance::builder()
        .with_name("payara6")
        .with_host("127.0.0.1")
        .with_admin_port(closed_port())
        .with_domains_dir(domains)
        .build()
        .unwrap()
}

/// **VALUE**: Verifies a server of the same release running another domain is not taken
/// for this instance.
///
/// **WHY THIS MATTERS**: Two domains of one installation report the same version; only
/// the domain folder tells them apart before start reports success for the wrong one.
///
/// **BUG THIS CATCHES**: Would catch the `__locations` answer being ignored or compared
/// against the domains folder instead of the domain folder.
#[tokio::test]
async fn given_occupant_reports_other_domain_when_checked_then_reported_root_returned() {
    // GIVEN: A local instance and an admin answering with another domain folder
    let domains = tempfile::tempdir().unwrap();
    let other = domains.path().join("domain2").display().to_string();
    let descriptor = local_descriptor(domains.path());
    let admin = Arc::new(LocationsAdmin(Some(other.clone())));
    let ctx = context_for(Operation::Start, Arc::new(Recorder::default()), descriptor.clone(), admin);

    // WHEN: Checking the occupant's domain folder
    let foreign = ctx.foreign_domain_root(&descriptor).await;

    // THEN: The reported folder is returned as foreign
    assert_eq!(foreign, Some(other));
}

#[tokio::test]
async fn given_occupant_reports_own_domain_when_checked_then_accepted() {
    let domains = tempfile::tempdir().unwrap();
    let descriptor = local_descriptor(domains.path());
    std::fs::create_dir_all(domains.path().join("domain1")).unwrap();
    let own = format!("{}/", domains.path().join("domain1").display());
    let admin = Arc::new(LocationsAdmin(Some(own)));
    let ctx = context_for(Operation::Start, Arc::new(Recorder::default()), descriptor.clone(), admin);

    assert_eq!(ctx.foreign_domain_root(&descriptor).await, None);
}

#[tokio::test]
async fn given_occupant_without_locations_command_when_checked_then_accepted() {
    let domains = tempfile::tempdir().unwrap();
    let descriptor = local_descriptor(domains.path());
    let admin = Arc::new(LocationsAdmin(None));
    let ctx = context_for(Operation::Start, Arc::new(Recorder::default()), descriptor.clone(), admin);

    assert_eq!(ctx.foreign_domain_root(&descriptor).await, None);
}
