use crate::admin::{AdminCommand, AdminTarget};
use crate::lifecycle::messages::MessageKey;
use crate::lifecycle::task::{TaskContext, WaitOutcome};

use models::{ServerInstance, ServerStatus, TaskEvent, TaskState};

use log::debug;

const POLLER_STOPPED: &str = "status poller stopped";

impl TaskContext {
    /// Bring the instance to `OFFLINE` through its admin listener.
    pub async fn stop_sequence(&self) -> TaskState {
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
            MessageKey::StopRunning,
            &[],
        );

        let mut status = match self.monitor.monitor(&self.instance).await {
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
        debug!("Stop of '{}' found status {status}", self.name());

        if status == ServerStatus::Startup {
            self.notify(
                TaskState::Running,
                TaskEvent::CmdRunning,
                MessageKey::StopWaitingStartup,
                &[],
            );
            let statuses = [ServerStatus::Online, ServerStatus::Shutdown, ServerStatus::Offline];
            status = match self
                .wait_for_status(&statuses, self.config.start_timeout(), None)
                .await
            {
                WaitOutcome::Reached(check) => check.status,
                WaitOutcome::NotMonitored => return self.poller_stopped(),
                WaitOutcome::TimedOut | WaitOutcome::ProcessExited => {
                    return self.notify(
                        TaskState::Failed,
                        TaskEvent::CmdFailed,
                        MessageKey::StartTimeout,
                        &[self.config.start_timeout_secs.to_string().as_str()],
                    );
                }
            };
        }

        match status {
            ServerStatus::Offline => {
                self.release_process();
                self.notify(
                    TaskState::Completed,
                    TaskEvent::CmdCompleted,
                    MessageKey::AlreadyStopped,
                    &[],
                )
            }
            ServerStatus::Shutdown => {
                self.notify(
                    TaskState::Running,
                    TaskEvent::CmdRunning,
                    MessageKey::StopWaitingShutdown,
                    &[],
                );
                self.await_offline().await
            }
            ServerStatus::Online | ServerStatus::Unknown | ServerStatus::Startup => {
                self.stop_running(&descriptor).await
            }
        }
    }

    async fn stop_running(&self, descriptor: &ServerInstance) -> TaskState {
        let result = self
            .admin
            .exec(&AdminTarget::from(descriptor), AdminCommand::StopDomain)
            .await;

        if let Some(event) = result.auth_failure {
            return self.notify(TaskState::Failed, event, MessageKey::StopAuthFailed, &[]);
        }
        if !result.is_completed() {
            return self.notify(
                TaskState::Failed,
                TaskEvent::CmdFailed,
                MessageKey::StopCommandFailed,
                &[result.message.as_str()],
            );
        }

        self.await_offline().await
    }

    async fn await_offline(&self) -> TaskState {
        match self
            .wait_for_status(&[ServerStatus::Offline], self.config.stop_timeout(), None)
            .await
        {
            WaitOutcome::Reached(_) => {
                self.release_process();
                self.notify(
                    TaskState::Completed,
                    TaskEvent::CmdCompleted,
                    MessageKey::StopCompleted,
                    &[],
                )
            }
            WaitOutcome::NotMonitored => self.poller_stopped(),
            WaitOutcome::TimedOut | WaitOutcome::ProcessExited => self.notify(
                TaskState::Failed,
                TaskEvent::CmdFailed,
                MessageKey::StopTimeout,
                &[self.config.stop_timeout_secs.to_string().as_str()],
            ),
        }
    }

    pub(crate) fn poller_stopped(&self) -> TaskState {
        self.notify(
            TaskState::Failed,
            TaskEvent::IllegalState,
            MessageKey::MonitoringFailed,
            &[POLLER_STOPPED],
        )
    }

    /// Forget the tracked process once the server is down.
    fn release_process(&self) {
        if let Some(process) = self.instance.take_process() {
            debug!("Released process {:?} of '{}'", process.pid(), self.name());
        }
    }
}
