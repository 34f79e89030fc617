//! Start, stop, restart and kill as one-shot tasks on a bounded pool.
//!
//! Every task reports through [`TaskContext::notify`], which updates the
//! instance state and informs the task's [`TaskListener`]s.

pub mod kill;
pub mod messages;
pub mod restart;
pub mod start;
pub mod stop;
pub mod task;

use task::{Operation, TaskContext};

use models::TaskState;

use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinHandle};

/// Handle of a submitted lifecycle task.
#[derive(Debug)]
pub struct TaskHandle {
    operation: Operation,
    instance: String,
    join: JoinHandle<TaskState>,
}

impl TaskHandle {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.join.abort_handle()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Final state of the task. Cancelled or panicked tasks are `Failed`.
    pub async fn wait(self) -> TaskState {
        match self.join.await {
            Ok(state) => state,
            Err(e) if e.is_cancelled() => {
                debug!("{} task of '{}' was cancelled", self.operation, self.instance);
                TaskState::Failed
            }
            Err(e) => {
                warn!("{} task of '{}' panicked: {e}", self.operation, self.instance);
                TaskState::Failed
            }
        }
    }
}

/// Runs lifecycle tasks, at most `pool_size` at a time.
pub struct LifecycleExecutor {
    permits: Arc<Semaphore>,
}

impl LifecycleExecutor {
    pub fn new(pool_size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(pool_size)),
        }
    }

    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn submit<F>(&self, operation: Operation, instance: &str, task: F) -> TaskHandle
    where
        F: Future<Output = TaskState> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let name = instance.to_string();

        let join = tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                warn!("{operation} task of '{name}' rejected: worker pool closed");
                return TaskState::Failed;
            };
            task.await
        });

        TaskHandle {
            operation,
            instance: instance.to_string(),
            join,
        }
    }

    /// Submit the sequence matching the context's operation.
    pub fn run(&self, ctx: TaskContext) -> TaskHandle {
        let operation = ctx.operation();
        let instance = ctx.name().to_string();
        self.submit(operation, &instance, async move {
            match operation {
                Operation::Start => ctx.start_sequence().await,
                Operation::Stop => ctx.stop_sequence().await,
                Operation::Restart => ctx.restart_sequence().await,
                Operation::Kill => ctx.kill_sequence().await,
            }
        })
    }

    pub fn shutdown(&self) {
        self.permits.close();
    }
}
