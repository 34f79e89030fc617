use std::fmt::{Display, Formatter, Result as FormatResult};

/// State of one asynchronous lifecycle command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Running,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Running)
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(match self {
            TaskState::Running => "RUNNING",
            TaskState::Completed => "COMPLETED",
            TaskState::Failed => "FAILED",
        })
    }
}

/// Typed reason attached to every lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskEvent {
    /// A precondition did not hold (monitoring unavailable, remote instance, port held).
    IllegalState,
    /// The remote admin command or the awaited transition failed.
    CmdFailed,
    CmdRunning,
    CmdCompleted,
    /// The admin command answered but rejected the credentials.
    AuthFailed,
    /// The admin listener rejected the credentials at the HTTP level.
    AuthFailedHttp,
    /// No local process is tracked for the instance.
    ProcessNotExists,
    /// The tracked local process has already exited.
    ProcessNotRunning,
    /// Unexpected local failure; the message is passed through.
    Exception,
}

impl TaskEvent {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, TaskEvent::AuthFailed | TaskEvent::AuthFailedHttp)
    }
}

impl Display for TaskEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(match self {
            TaskEvent::IllegalState => "ILLEGAL_STATE",
            TaskEvent::CmdFailed => "CMD_FAILED",
            TaskEvent::CmdRunning => "CMD_RUNNING",
            TaskEvent::CmdCompleted => "CMD_COMPLETED",
            TaskEvent::AuthFailed => "AUTH_FAILED",
            TaskEvent::AuthFailedHttp => "AUTH_FAILED_HTTP",
            TaskEvent::ProcessNotExists => "PROCESS_NOT_EXISTS",
            TaskEvent::ProcessNotRunning => "PROCESS_NOT_RUNNING",
            TaskEvent::Exception => "EXCEPTION",
        })
    }
}
