//! Local server processes: launching, liveness, killing and port ownership.

pub mod launch;

use crate::error::process::ProcessError;

use common::ErrorLocation;

use std::panic::Location;
use std::process::ExitStatus;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace, warn};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, SocketInfo, TcpState, get_sockets_info,
};
use sysinfo::{Pid, Process, ProcessesToUpdate, System};
use tokio::net::TcpStream;
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::time::{sleep, timeout};

const KILL_VERIFY_MAX_ELAPSED: Duration = Duration::from_secs(5);
const INIT_PID: u32 = 1;

/// Whether something accepts TCP connections on `host:port` within `connect_timeout`.
pub async fn port_in_use(host: &str, port: u16, connect_timeout: Duration) -> bool {
    match timeout(connect_timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            trace!("Connect to {host}:{port} failed: {e}");
            false
        }
        Err(_) => {
            trace!("Connect to {host}:{port} timed out after {connect_timeout:?}");
            false
        }
    }
}

/// Process found listening on a local port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOwner {
    pub pid: u32,
    pub name: String,
    pub command: String,
}

#[track_caller]
fn query_tcp_sockets() -> Result<Vec<SocketInfo>, ProcessError> {
    get_sockets_info(
        AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6,
        ProtocolFlags::TCP,
    )
    .map_err(|e| ProcessError::NetworkQuery {
        message: format!("Failed to query network sockets: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })
}

/// Identify the local process listening on `port`, for diagnostics when a
/// start finds the admin port already taken.
#[track_caller]
pub fn find_port_owner(port: u16) -> Result<Option<PortOwner>, ProcessError> {
    let sockets = query_tcp_sockets()?;

    for s in sockets {
        if let ProtocolSocketInfo::Tcp(tcp) = s.protocol_socket_info
            && tcp.state == TcpState::Listen
            && tcp.local_port == port
            && let Some(&pid) = s.associated_pids.first()
        {
            trace!("Found process {pid} listening on port {port}");

            let owner = with_process(pid, |p| PortOwner {
                pid,
                name: p.name().to_string_lossy().to_string(),
                command: format_command(p),
            });

            if owner.is_some() {
                return Ok(owner);
            }

            trace!("Process {pid} disappeared before we could read its info");
        }
    }

    debug!("No process found listening on port {port}");
    Ok(None)
}

pub(crate) fn with_process<F, R>(pid: u32, f: F) -> Option<R>
where
    F: FnOnce(&Process) -> R,
{
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);

    sys.process(Pid::from_u32(pid)).map(f)
}

pub(crate) fn format_command(process: &Process) -> String {
    process
        .cmd()
        .iter()
        .map(|s| s.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================
// SERVER PROCESS
// ============================================

/// A server JVM launched by this tool.
///
/// The child handle sits behind a mutex so liveness checks and kills can run
/// from whichever task holds the instance.
#[derive(Debug)]
pub struct ServerProcess {
    pid: Option<u32>,
    child: Mutex<Child>,
}

impl ServerProcess {
    pub fn from_child(child: Child) -> Self {
        Self {
            pid: child.id(),
            child: Mutex::new(child),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn try_exit_status(&self) -> Option<ExitStatus> {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        match child.try_wait() {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to query process {:?}: {e}", self.pid);
                None
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.try_exit_status().is_none()
    }

    /// Take the piped stdout and stderr. Only the first call gets them.
    pub fn take_output(&self) -> (Option<ChildStdout>, Option<ChildStderr>) {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        (child.stdout.take(), child.stderr.take())
    }

    /// Force-kill the process and verify it exited.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Kill`] if the signal cannot be delivered or the
    /// process is still alive once the backoff is exhausted.
    pub async fn kill(&self) -> Result<(), ProcessError> {
        if self.pid == Some(INIT_PID) {
            return Err(ProcessError::Kill {
                message: String::from("Refusing to kill PID 1"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        {
            let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = child.start_kill() {
                // Already reaped: nothing to kill.
                if child.try_wait().ok().flatten().is_some() {
                    return Ok(());
                }
                return Err(ProcessError::Kill {
                    message: format!("Failed to kill process {:?}: {e}", self.pid),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            debug!("Sent kill to PID {:?}", self.pid);
        }

        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(KILL_VERIFY_MAX_ELAPSED),
            ..Default::default()
        };

        loop {
            if let Some(status) = self.try_exit_status() {
                debug!("Process {:?} terminated: {status}", self.pid);
                return Ok(());
            }

            match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Process {:?} still alive, retrying after {duration:?}", self.pid);
                    sleep(duration).await;
                }
                None => {
                    return Err(ProcessError::Kill {
                        message: format!(
                            "Process {:?} still running after {KILL_VERIFY_MAX_ELAPSED:?}",
                            self.pid
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }
    }
}
