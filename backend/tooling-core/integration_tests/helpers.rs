//! Fakes and fixtures shared by the integration tests.
//!
//! - `FakeAdmin` answers admin commands without a server and can release a
//!   held admin port when asked to stop the domain
//! - `CountingLauncher` records launch attempts and never spawns anything
//! - `Recorder` and `CollectingSink` capture task notifications and log lines

use tooling_core::admin::{AdminCommand, AdminResult, AdminTarget, ServerAdmin};
use tooling_core::config::ToolingConfig;
use tooling_core::error::process::ProcessError;
use tooling_core::lifecycle::task::TaskListener;
use tooling_core::log_view::pipeline::{LogSink, RenderedLine};
use tooling_core::process::ServerProcess;
use tooling_core::process::launch::ProcessLauncher;

use common::ErrorLocation;

use models::{ServerInstance, TaskEvent, TaskState};

use std::net::TcpListener;
use std::panic::Location;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

/// How [`FakeAdmin`] answers `version`.
#[derive(Clone)]
pub enum VersionAnswer {
    Reports(String),
    RejectsCredentials,
}

pub struct FakeAdmin {
    version: VersionAnswer,
    /// Dropped on `stop-domain`, closing the admin port.
    held_port: Mutex<Option<TcpListener>>,
    pub calls: AtomicUsize,
}

impl FakeAdmin {
    pub fn new(version: VersionAnswer) -> Self {
        Self {
            version,
            held_port: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reporting(version: &str) -> Self {
        Self::new(VersionAnswer::Reports(version.to_string()))
    }

    pub fn holding(self, listener: TcpListener) -> Self {
        *self.held_port.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
        self
    }
}

#[async_trait]
impl ServerAdmin for FakeAdmin {
    async fn exec(&self, _target: &AdminTarget, command: AdminCommand) -> AdminResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match command {
            AdminCommand::Version => match &self.version {
                VersionAnswer::Reports(version) => AdminResult::completed(version.clone()),
                VersionAnswer::RejectsCredentials => {
                    AdminResult::auth_rejected(TaskEvent::AuthFailedHttp, "HTTP 401")
                }
            },
            AdminCommand::StopDomain => {
                self.held_port
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                AdminResult::completed("Command stop-domain executed successfully.")
            }
            AdminCommand::Locations => AdminResult::failed("not supported"),
        }
    }
}

#[derive(Default)]
pub struct CountingLauncher {
    pub launches: AtomicUsize,
}

impl ProcessLauncher for CountingLauncher {
    fn launch(&self, _instance: &ServerInstance) -> Result<ServerProcess, ProcessError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Err(ProcessError::Configuration {
            message: String::from("launching disabled in tests"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<(TaskState, TaskEvent, String)>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<(TaskState, TaskEvent, String)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<(TaskState, TaskEvent, String)> {
        self.events().pop()
    }
}

impl TaskListener for Recorder {
    fn operation_state_changed(&self, state: TaskState, event: TaskEvent, message: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((state, event, message.to_string()));
    }
}

#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for CollectingSink {
    fn line(&self, _instance: &str, line: RenderedLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.text);
    }
}

/// Short timeouts so failing paths finish quickly.
pub fn fast_config() -> ToolingConfig {
    let mut config = ToolingConfig::default();
    config.status.poll_interval_ms = 50;
    config.status.monitor_settle_ms = 2000;
    config.status.connect_timeout_ms = 200;
    config.status.admin_timeout_ms = 1000;
    config.lifecycle.start_timeout_secs = 2;
    config.lifecycle.stop_timeout_secs = 2;
    config.lifecycle.restart_delay_secs = 0;
    config.lifecycle.kill_grace_ms = 500;
    config.lifecycle.kill_poll_ms = 20;
    config.lifecycle.wait_tick_ms = 20;
    config.log.read_delay_ms = 20;
    config
}

/// A listening socket standing in for a server's admin port.
pub fn occupied_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let port = listener.local_addr().expect("listener address").port();
    (listener, port)
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let (_listener, port) = occupied_port();
    port
}

/// Descriptor of a local domain under `domains_dir` whose admin port is `admin_port`.
pub fn local_instance(name: &str, domains_dir: &std::path::Path, admin_port: u16) -> ServerInstance {
    ServerInstance::builder()
        .with_name(name)
        .with_host("127.0.0.1")
        .with_admin_port(admin_port)
        .with_http_port(if admin_port == 8080 { 8081 } else { 8080 })
        .with_domains_dir(domains_dir)
        .build()
        .expect("valid test descriptor")
}

/// Poll `condition` every few milliseconds until it holds or `limit` passes.
pub async fn eventually(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
