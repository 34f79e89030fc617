use crate::admin::{AdminCommand, AdminTarget, versions_match};
use crate::lifecycle::messages::MessageKey;
use crate::lifecycle::task::{TaskContext, WaitOutcome};
use crate::process::{find_port_owner, port_in_use};

use models::{JvmMode, ServerInstance, ServerState, ServerStatus, TaskEvent, TaskState};

use std::fs::canonicalize;
use std::path::Path;
use std::sync::Arc;

use log::debug;

/// Property of the `__locations` answer holding the domain folder.
const DOMAIN_ROOT_PROPERTY: &str = "Domain-Root";

impl TaskContext {
    /// Bring the instance to `ONLINE`, launching it only when nothing
    /// already answers on its admin port.
    pub async fn start_sequence(&self) -> TaskState {
        let descriptor = match self.instance.descriptor() {
            Ok(descriptor) => descriptor,
            Err(e) => {
                return self.notify(
                    TaskState::Failed,
                    TaskEvent::Exception,
                    MessageKey::Exception,
                    &[e.to_string().as_str()],
                );
            }
        };

        self.notify(
            TaskState::Running,
            TaskEvent::CmdRunning,
            MessageKey::StartRunning,
            &[],
        );

        let status = match self.monitor.monitor(&self.instance).await {
            Ok(status) => status,
            Err(e) => {
                return self.notify(
                    TaskState::Failed,
                    TaskEvent::IllegalState,
                    MessageKey::MonitoringFailed,
                    &[e.to_string().as_str()],
                );
            }
        };
        debug!("Start of '{}' found status {status}", self.name());

        if descriptor.is_remote() {
            return if status == ServerStatus::Online {
                self.notify(
                    TaskState::Completed,
                    TaskEvent::CmdCompleted,
                    MessageKey::AlreadyRunning,
                    &[],
                )
            } else {
                self.notify(
                    TaskState::Failed,
                    TaskEvent::IllegalState,
                    MessageKey::StartRemote,
                    &[],
                )
            };
        }

        match status {
            ServerStatus::Online => {
                return self.notify(
                    TaskState::Completed,
                    TaskEvent::CmdCompleted,
                    MessageKey::AlreadyRunning,
                    &[],
                );
            }
            ServerStatus::Startup => return self.await_running_start().await,
            ServerStatus::Shutdown => {
                self.notify(
                    TaskState::Running,
                    TaskEvent::CmdRunning,
                    MessageKey::StartWaitingShutdown,
                    &[],
                );
                match self
                    .wait_for_status(&[ServerStatus::Offline], self.config.stop_timeout(), None)
                    .await
                {
                    WaitOutcome::Reached(_) => {}
                    WaitOutcome::NotMonitored => return self.poller_stopped(),
                    WaitOutcome::TimedOut | WaitOutcome::ProcessExited => {
                        return self.notify(
                            TaskState::Failed,
                            TaskEvent::CmdFailed,
                            MessageKey::StopTimeout,
                            &[self.config.stop_timeout_secs.to_string().as_str()],
                        );
                    }
                }
            }
            ServerStatus::Offline | ServerStatus::Unknown => {}
        }

        self.start_offline(&descriptor).await
    }

    /// Someone else is already starting the server; wait for the outcome.
    async fn await_running_start(&self) -> TaskState {
        self.notify(
            TaskState::Running,
            TaskEvent::CmdRunning,
            MessageKey::StartWaitingStartup,
            &[],
        );

        let statuses = [ServerStatus::Online, ServerStatus::Shutdown, ServerStatus::Offline];
        match self
            .wait_for_status(&statuses, self.config.start_timeout(), None)
            .await
        {
            WaitOutcome::Reached(check) if check.status == ServerStatus::Online => self.notify(
                TaskState::Completed,
                TaskEvent::CmdCompleted,
                MessageKey::StartCompleted,
                &[],
            ),
            WaitOutcome::Reached(check) => self.notify(
                TaskState::Failed,
                TaskEvent::CmdFailed,
                MessageKey::StartFailed,
                &[check.status.as_str()],
            ),
            WaitOutcome::NotMonitored => self.poller_stopped(),
            WaitOutcome::TimedOut | WaitOutcome::ProcessExited => self.notify(
                TaskState::Failed,
                TaskEvent::CmdFailed,
                MessageKey::StartTimeout,
                &[self.config.start_timeout_secs.to_string().as_str()],
            ),
        }
    }

    async fn start_offline(&self, descriptor: &ServerInstance) -> TaskState {
        let port = descriptor.admin_port.to_string();

        if port_in_use(&descriptor.host, descriptor.admin_port, self.connect_timeout).await {
            return self.start_on_occupied_port(descriptor, &port).await;
        }

        let process = match self.launcher.launch(descriptor) {
            Ok(process) => Arc::new(process),
            Err(e) => {
                return self.notify(
                    TaskState::Failed,
                    TaskEvent::Exception,
                    MessageKey::LaunchFailed,
                    &[e.to_string().as_str()],
                );
            }
        };
        self.instance.set_process(Arc::clone(&process));
        self.log_views.attach_process(self.name(), &process);

        // A profiled JVM blocks until the profiler attaches; the status
        // listener moves the state on once the server answers.
        if descriptor.jvm_mode == JvmMode::Profile {
            self.instance.set_state(ServerState::StoppedJvmProfiler);
            return self.notify(
                TaskState::Completed,
                TaskEvent::CmdCompleted,
                MessageKey::ProfilerWaiting,
                &[],
            );
        }

        self.notify(
            TaskState::Running,
            TaskEvent::CmdRunning,
            MessageKey::Launched,
            &[],
        );

        let statuses = [ServerStatus::Online, ServerStatus::Shutdown];
        match self
            .wait_for_status(&statuses, self.config.start_timeout(), Some(&process))
            .await
        {
            WaitOutcome::Reached(check) if check.status == ServerStatus::Online => self.notify(
                TaskState::Completed,
                TaskEvent::CmdCompleted,
                MessageKey::StartCompleted,
                &[],
            ),
            WaitOutcome::Reached(check) => self.notify(
                TaskState::Failed,
                TaskEvent::CmdFailed,
                MessageKey::StartFailed,
                &[check.status.as_str()],
            ),
            WaitOutcome::ProcessExited => {
                self.instance.take_process();
                self.notify(
                    TaskState::Failed,
                    TaskEvent::ProcessNotRunning,
                    MessageKey::ProcessExited,
                    &[],
                )
            }
            WaitOutcome::NotMonitored => self.poller_stopped(),
            WaitOutcome::TimedOut => self.notify(
                TaskState::Failed,
                TaskEvent::CmdFailed,
                MessageKey::StartTimeout,
                &[self.config.start_timeout_secs.to_string().as_str()],
            ),
        }
    }

    /// The admin port answers although the poller saw the server offline:
    /// find out whether it is our server before touching anything.
    async fn start_on_occupied_port(&self, descriptor: &ServerInstance, port: &str) -> TaskState {
        if let Ok(Some(owner)) = find_port_owner(descriptor.admin_port) {
            debug!(
                "Admin port {port} of '{}' held by {} (PID: {}): {}",
                self.name(),
                owner.name,
                owner.pid,
                owner.command
            );
        }

        let result = self
            .admin
            .exec(&AdminTarget::from(descriptor), AdminCommand::Version)
            .await;

        if let Some(event) = result.auth_failure {
            return self.notify(
                TaskState::Failed,
                event,
                MessageKey::PortOccupiedAuth,
                &[port],
            );
        }

        if !result.is_completed() {
            return self.notify(
                TaskState::Failed,
                TaskEvent::IllegalState,
                MessageKey::PortOccupiedUnreachable,
                &[port, result.message.as_str()],
            );
        }

        if versions_match(descriptor.version.as_deref(), &result.message) {
            if let Some(other) = self.foreign_domain_root(descriptor).await {
                return self.notify(
                    TaskState::Failed,
                    TaskEvent::CmdFailed,
                    MessageKey::PortOccupiedOtherDomain,
                    &[port, other.as_str()],
                );
            }
            self.notify(
                TaskState::Completed,
                TaskEvent::CmdCompleted,
                MessageKey::PortOccupiedSameServer,
                &[port],
            )
        } else {
            self.notify(
                TaskState::Failed,
                TaskEvent::CmdFailed,
                MessageKey::PortOccupiedOther,
                &[port, result.message.as_str()],
            )
        }
    }

    /// Domain folder reported by `__locations` when it is not the one of
    /// `descriptor`. Servers that do not answer the command are accepted.
    pub(crate) async fn foreign_domain_root(&self, descriptor: &ServerInstance) -> Option<String> {
        let expected = descriptor.domain_dir()?;
        let result = self
            .admin
            .exec(&AdminTarget::from(descriptor), AdminCommand::Locations)
            .await;
        if !result.is_completed() {
            debug!("No locations from '{}': {}", self.name(), result.message);
            return None;
        }

        let reported = result.properties.get(DOMAIN_ROOT_PROPERTY)?;
        let same = match (canonicalize(&expected), canonicalize(reported)) {
            (Ok(expected), Ok(reported)) => expected == reported,
            _ => expected.as_path() == Path::new(reported),
        };
        (!same).then(|| reported.clone())
    }
}
