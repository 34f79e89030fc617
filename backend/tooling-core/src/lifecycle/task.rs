use crate::admin::ServerAdmin;
use crate::config::LifecycleConfig;
use crate::lifecycle::messages::MessageKey;
use crate::log_view::LogViewManager;
use crate::process::ServerProcess;
use crate::process::launch::ProcessLauncher;
use crate::registry::Instance;
use crate::status::StatusMonitor;
use crate::status::check::StatusCheck;
use crate::status::listener::{ListenerId, StatusWaiter};

use models::{ServerState, ServerStatus, TaskEvent, TaskState};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::time::{Instant, sleep};

/// Receives every lifecycle notification of a task.
pub trait TaskListener: Send + Sync {
    fn operation_state_changed(&self, state: TaskState, event: TaskEvent, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Start,
    Stop,
    Restart,
    Kill,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(match self {
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Restart => "restart",
            Operation::Kill => "kill",
        })
    }
}

/// Moves the instance state along with the notifications of one operation.
pub struct StateTaskListener {
    instance: Arc<Instance>,
    operation: Operation,
}

impl StateTaskListener {
    pub fn new(instance: Arc<Instance>, operation: Operation) -> Self {
        Self {
            instance,
            operation,
        }
    }

    pub(crate) fn next_state(operation: Operation, state: TaskState, event: TaskEvent) -> Option<ServerState> {
        match (operation, state) {
            (Operation::Start, TaskState::Running) => Some(ServerState::Starting),
            (Operation::Start, TaskState::Completed) => Some(ServerState::Running),
            (Operation::Start, TaskState::Failed) => match event {
                TaskEvent::ProcessNotRunning | TaskEvent::CmdFailed => Some(ServerState::Stopped),
                _ => Some(ServerState::Unknown),
            },
            (Operation::Stop | Operation::Restart | Operation::Kill, TaskState::Running) => {
                Some(ServerState::Stopping)
            }
            (Operation::Stop | Operation::Restart | Operation::Kill, TaskState::Completed) => {
                Some(ServerState::Stopped)
            }
            (_, TaskState::Failed) => Some(ServerState::Unknown),
        }
    }
}

impl TaskListener for StateTaskListener {
    fn operation_state_changed(&self, state: TaskState, event: TaskEvent, _message: &str) {
        let profiling = self.instance.state() == ServerState::StoppedJvmProfiler;
        if self.operation == Operation::Start && state == TaskState::Completed && profiling {
            return;
        }
        if let Some(next) = Self::next_state(self.operation, state, event) {
            self.instance.set_state(next);
        }
    }
}

pub(crate) enum WaitOutcome {
    Reached(StatusCheck),
    ProcessExited,
    TimedOut,
    NotMonitored,
}

/// Everything one lifecycle task works with.
#[derive(Clone)]
pub struct TaskContext {
    pub instance: Arc<Instance>,
    pub monitor: Arc<StatusMonitor>,
    pub admin: Arc<dyn ServerAdmin>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub log_views: Arc<LogViewManager>,
    pub config: LifecycleConfig,
    pub connect_timeout: Duration,
    listeners: Vec<Arc<dyn TaskListener>>,
    state_listener: Arc<StateTaskListener>,
    operation: Operation,
    /// Completion is an intermediate step of a longer operation (stop during restart).
    intermediate: bool,
}

impl TaskContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operation: Operation,
        instance: Arc<Instance>,
        monitor: Arc<StatusMonitor>,
        admin: Arc<dyn ServerAdmin>,
        launcher: Arc<dyn ProcessLauncher>,
        log_views: Arc<LogViewManager>,
        config: LifecycleConfig,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            state_listener: Arc::new(StateTaskListener::new(Arc::clone(&instance), operation)),
            instance,
            monitor,
            admin,
            launcher,
            log_views,
            config,
            connect_timeout,
            listeners: Vec::new(),
            operation,
            intermediate: false,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn TaskListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn name(&self) -> &str {
        self.instance.name()
    }

    /// Same task, reporting as another operation's step.
    pub(crate) fn phase(&self, operation: Operation, intermediate: bool) -> Self {
        let mut ctx = self.clone();
        ctx.state_listener = Arc::new(StateTaskListener::new(Arc::clone(&self.instance), operation));
        ctx.intermediate = intermediate;
        ctx
    }

    /// The single notification funnel: resolve the message, update the
    /// instance state, inform every listener and hand `state` back.
    pub(crate) fn notify(
        &self,
        state: TaskState,
        event: TaskEvent,
        key: MessageKey,
        args: &[&str],
    ) -> TaskState {
        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(self.name());
        full_args.extend_from_slice(args);
        let message = key.format(&full_args);

        match state {
            TaskState::Failed => warn!("[{}] {event}: {message}", self.operation),
            TaskState::Completed => info!("[{}] {event}: {message}", self.operation),
            TaskState::Running => debug!("[{}] {event}: {message}", self.operation),
        }

        self.state_listener
            .operation_state_changed(state, event, &message);

        let (reported_state, reported_event) = if self.intermediate && state == TaskState::Completed {
            (TaskState::Running, TaskEvent::CmdRunning)
        } else {
            (state, event)
        };
        for listener in &self.listeners {
            listener.operation_state_changed(reported_state, reported_event, &message);
        }

        state
    }

    /// Wait until a poll reports one of `statuses`, `limit` elapses or, when
    /// given, `process` exits. Checked every wait tick.
    pub(crate) async fn wait_for_status(
        &self,
        statuses: &[ServerStatus],
        limit: Duration,
        process: Option<&ServerProcess>,
    ) -> WaitOutcome {
        let (waiter, mut rx) = StatusWaiter::new();
        let id = match self.monitor.add_listener(self.name(), waiter, true, statuses) {
            Ok(id) => id,
            Err(e) => {
                debug!("Cannot wait for {statuses:?}: {e}");
                return WaitOutcome::NotMonitored;
            }
        };
        let _registration = WaiterRegistration {
            monitor: &self.monitor,
            instance: self.name(),
            id,
        };

        let deadline = Instant::now() + limit;
        let tick = self.config.wait_tick();

        loop {
            tokio::select! {
                received = &mut rx => {
                    return match received {
                        Ok(check) => WaitOutcome::Reached(check),
                        Err(_) => WaitOutcome::NotMonitored,
                    };
                }
                _ = sleep(tick) => {
                    if process.is_some_and(|p| !p.is_running()) {
                        return WaitOutcome::ProcessExited;
                    }
                    if Instant::now() >= deadline {
                        return WaitOutcome::TimedOut;
                    }
                }
            }
        }
    }
}

/// Unregisters a status waiter however the wait ends, including the task being aborted.
struct WaiterRegistration<'a> {
    monitor: &'a StatusMonitor,
    instance: &'a str,
    id: ListenerId,
}

impl Drop for WaiterRegistration<'_> {
    fn drop(&mut self) {
        if self.monitor.remove_listener(self.instance, self.id) {
            trace!("Removed status waiter {} of '{}'", self.id, self.instance);
        }
    }
}
