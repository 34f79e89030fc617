/// Message templates of lifecycle notifications. `{0}` is always the
/// instance name; further placeholders are documented per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    StartRunning,
    /// `{1}`: error
    MonitoringFailed,
    StartRemote,
    AlreadyRunning,
    StartWaitingStartup,
    StartWaitingShutdown,
    /// `{1}`: admin port
    PortOccupiedSameServer,
    /// `{1}`: admin port
    PortOccupiedAuth,
    /// `{1}`: admin port, `{2}`: reported version
    PortOccupiedOther,
    /// `{1}`: admin port, `{2}`: domain folder the server reports
    PortOccupiedOtherDomain,
    /// `{1}`: admin port, `{2}`: admin command message
    PortOccupiedUnreachable,
    /// `{1}`: error
    LaunchFailed,
    Launched,
    ProfilerWaiting,
    StartCompleted,
    /// `{1}`: status reached instead of ONLINE
    StartFailed,
    ProcessExited,
    /// `{1}`: seconds
    StartTimeout,
    StopRunning,
    AlreadyStopped,
    StopWaitingStartup,
    StopWaitingShutdown,
    StopAuthFailed,
    /// `{1}`: admin command message
    StopCommandFailed,
    StopCompleted,
    /// `{1}`: seconds
    StopTimeout,
    RestartRunning,
    /// `{1}`: seconds
    RestartDelay,
    KillRunning,
    KillStartAborted,
    KillNoProcess,
    KillNotRunning,
    /// `{1}`: error
    KillFailed,
    KillCompleted,
    /// `{1}`: error
    Exception,
}

impl MessageKey {
    pub fn template(&self) -> &'static str {
        match self {
            MessageKey::StartRunning => "Starting server {0}",
            MessageKey::MonitoringFailed => "Cannot monitor server {0}: {1}",
            MessageKey::StartRemote => "Server {0} is remote and not running; remote servers cannot be started",
            MessageKey::AlreadyRunning => "Server {0} is already running",
            MessageKey::StartWaitingStartup => "Server {0} is starting up, waiting for it to finish",
            MessageKey::StartWaitingShutdown => "Server {0} is shutting down, waiting before starting it again",
            MessageKey::PortOccupiedSameServer => "Server {0} is already running on admin port {1}",
            MessageKey::PortOccupiedAuth => "Admin port {1} of server {0} is held by a server that rejected the credentials",
            MessageKey::PortOccupiedOther => "Admin port {1} of server {0} is used by another server ({2})",
            MessageKey::PortOccupiedOtherDomain => "Admin port {1} of server {0} is used by the same server release running domain {2}",
            MessageKey::PortOccupiedUnreachable => "Admin port {1} of server {0} is occupied but the admin command failed: {2}",
            MessageKey::LaunchFailed => "Failed to launch server {0}: {1}",
            MessageKey::Launched => "Server {0} launched, waiting for it to come online",
            MessageKey::ProfilerWaiting => "Server {0} launched in profile mode, waiting for a profiler to attach",
            MessageKey::StartCompleted => "Server {0} started",
            MessageKey::StartFailed => "Server {0} failed to start, status is {1}",
            MessageKey::ProcessExited => "Server {0} process exited before the server came online",
            MessageKey::StartTimeout => "Server {0} did not start within {1} seconds",
            MessageKey::StopRunning => "Stopping server {0}",
            MessageKey::AlreadyStopped => "Server {0} is not running",
            MessageKey::StopWaitingStartup => "Server {0} is starting up, waiting before stopping it",
            MessageKey::StopWaitingShutdown => "Server {0} is already shutting down, waiting for it to finish",
            MessageKey::StopAuthFailed => "Server {0} rejected the credentials of the stop command",
            MessageKey::StopCommandFailed => "Stop command for server {0} failed: {1}",
            MessageKey::StopCompleted => "Server {0} stopped",
            MessageKey::StopTimeout => "Server {0} did not stop within {1} seconds",
            MessageKey::RestartRunning => "Restarting server {0}",
            MessageKey::RestartDelay => "Server {0} stopped, starting it again in {1} seconds",
            MessageKey::KillRunning => "Killing server {0}",
            MessageKey::KillStartAborted => "Aborted the pending start of server {0}",
            MessageKey::KillNoProcess => "Server {0} has no process started by this tool",
            MessageKey::KillNotRunning => "Process of server {0} is no longer running",
            MessageKey::KillFailed => "Failed to kill server {0}: {1}",
            MessageKey::KillCompleted => "Server {0} killed",
            MessageKey::Exception => "Server {0}: {1}",
        }
    }

    /// Substitute `{n}` with `args[n]`. Placeholders without an argument stay as they are.
    pub fn format(&self, args: &[&str]) -> String {
        let mut message = self.template().to_string();
        for (index, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{index}}}"), arg);
        }
        message
    }
}
