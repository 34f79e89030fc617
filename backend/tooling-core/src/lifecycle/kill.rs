use crate::lifecycle::messages::MessageKey;
use crate::lifecycle::task::{TaskContext, WaitOutcome};

use models::{ServerStatus, TaskEvent, TaskState};

use log::{debug, warn};
use tokio::time::{Instant, sleep};

impl TaskContext {
    /// Force-kill the process this tool launched for the instance.
    pub async fn kill_sequence(&self) -> TaskState {
        self.notify(
            TaskState::Running,
            TaskEvent::CmdRunning,
            MessageKey::KillRunning,
            &[],
        );

        self.abort_pending_start().await;

        let Some(process) = self.instance.process() else {
            return self.notify(
                TaskState::Failed,
                TaskEvent::ProcessNotExists,
                MessageKey::KillNoProcess,
                &[],
            );
        };

        if !process.is_running() {
            self.instance.take_process();
            return self.notify(
                TaskState::Failed,
                TaskEvent::ProcessNotRunning,
                MessageKey::KillNotRunning,
                &[],
            );
        }

        if let Err(e) = process.kill().await {
            return self.notify(
                TaskState::Failed,
                TaskEvent::Exception,
                MessageKey::KillFailed,
                &[e.to_string().as_str()],
            );
        }
        self.instance.take_process();
        self.log_views.stop(self.name());

        if self.monitor.is_monitored(self.name()) {
            match self
                .wait_for_status(&[ServerStatus::Offline], self.config.stop_timeout(), None)
                .await
            {
                WaitOutcome::Reached(_) | WaitOutcome::NotMonitored => {}
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

        self.notify(
            TaskState::Completed,
            TaskEvent::CmdCompleted,
            MessageKey::KillCompleted,
            &[],
        )
    }

    /// Abort the outstanding start task and give it a bounded grace period
    /// to wind down.
    async fn abort_pending_start(&self) {
        let Some(start) = self.instance.take_start_task() else {
            return;
        };
        if start.is_finished() {
            return;
        }

        start.abort();
        let deadline = Instant::now() + self.config.kill_grace();
        while !start.is_finished() {
            if Instant::now() >= deadline {
                warn!("Start task of '{}' still running after abort", self.name());
                return;
            }
            sleep(self.config.kill_poll()).await;
        }

        debug!("Start task of '{}' finished after abort", self.name());
        self.notify(
            TaskState::Running,
            TaskEvent::CmdRunning,
            MessageKey::KillStartAborted,
            &[],
        );
    }
}
