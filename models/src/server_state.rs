use std::fmt::{Display, Formatter, Result as FormatResult};

/// Authoritative lifecycle state of one registered instance.
///
/// Only listeners move an instance between states: the lifecycle task listener
/// reacts to start/stop/kill progress, the status listener to poll results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServerState {
    #[default]
    Unknown,
    Stopped,
    Starting,
    Running,
    Stopping,
    StoppedJvmProfiler,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerState::Unknown => "UNKNOWN",
            ServerState::Stopped => "STOPPED",
            ServerState::Starting => "STARTING",
            ServerState::Running => "RUNNING",
            ServerState::Stopping => "STOPPING",
            ServerState::StoppedJvmProfiler => "STOPPED_JVM_PROFILER",
        }
    }

    /// States in which a lifecycle command is already in flight.
    pub fn is_transitional(&self) -> bool {
        matches!(self, ServerState::Starting | ServerState::Stopping)
    }
}

impl Display for ServerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(self.as_str())
    }
}

/// Reachability classification produced by one status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServerStatus {
    Offline,
    Startup,
    Online,
    Shutdown,
    #[default]
    Unknown,
}

impl ServerStatus {
    pub const ALL: [ServerStatus; 5] = [
        ServerStatus::Offline,
        ServerStatus::Startup,
        ServerStatus::Online,
        ServerStatus::Shutdown,
        ServerStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Offline => "OFFLINE",
            ServerStatus::Startup => "STARTUP",
            ServerStatus::Online => "ONLINE",
            ServerStatus::Shutdown => "SHUTDOWN",
            ServerStatus::Unknown => "UNKNOWN",
        }
    }
}

impl Display for ServerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(self.as_str())
    }
}

impl From<ServerStatus> for ServerState {
    fn from(status: ServerStatus) -> Self {
        match status {
            ServerStatus::Offline => ServerState::Stopped,
            ServerStatus::Startup => ServerState::Starting,
            ServerStatus::Online => ServerState::Running,
            ServerStatus::Shutdown => ServerState::Stopping,
            ServerStatus::Unknown => ServerState::Unknown,
        }
    }
}

/// Broadcast after an instance's state changed and its lock was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub instance: String,
    pub old: ServerState,
    pub new: ServerState,
}
