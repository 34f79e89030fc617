use crate::lifecycle::messages::MessageKey;
use crate::lifecycle::task::{Operation, TaskContext};

use models::{TaskEvent, TaskState};

use tokio::time::sleep;

impl TaskContext {
    /// Stop, wait the restart delay, start.
    pub async fn restart_sequence(&self) -> TaskState {
        self.notify(
            TaskState::Running,
            TaskEvent::CmdRunning,
            MessageKey::RestartRunning,
            &[],
        );

        if self.phase(Operation::Stop, true).stop_sequence().await == TaskState::Failed {
            return TaskState::Failed;
        }

        let start = self.phase(Operation::Start, false);
        start.notify(
            TaskState::Running,
            TaskEvent::CmdRunning,
            MessageKey::RestartDelay,
            &[self.config.restart_delay_secs.to_string().as_str()],
        );
        sleep(self.config.restart_delay()).await;

        start.start_sequence().await
    }
}
