use crate::admin::{AdminCommand, AdminTarget, ServerAdmin, versions_match};
use crate::process::port_in_use;

use models::{ServerInstance, ServerStatus, TaskEvent};

use std::time::Duration;

use log::trace;

/// Why the `version` command did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminFailure {
    /// Credentials rejected; carries `AuthFailed` or `AuthFailedHttp`.
    AuthRejected(TaskEvent),
    /// Nothing answered on the admin listener.
    Unreachable(String),
    Failed(String),
}

/// Raw observations of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    pub port_open: bool,
    /// `None` when the port was closed and no command was sent.
    pub version: Option<Result<String, AdminFailure>>,
}

impl PollResult {
    pub fn closed() -> Self {
        Self {
            port_open: false,
            version: None,
        }
    }

    pub fn answered(version: impl Into<String>) -> Self {
        Self {
            port_open: true,
            version: Some(Ok(version.into())),
        }
    }

    pub fn failed(failure: AdminFailure) -> Self {
        Self {
            port_open: true,
            version: Some(Err(failure)),
        }
    }
}

/// What status listeners receive on every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCheck {
    pub status: ServerStatus,
    pub port_open: bool,
    pub version: Option<String>,
    pub message: String,
}

impl StatusCheck {
    pub fn new(status: ServerStatus, polled: &PollResult) -> Self {
        let (version, message) = match &polled.version {
            None => (None, String::from("admin port closed")),
            Some(Ok(version)) => (Some(version.clone()), version.clone()),
            Some(Err(AdminFailure::AuthRejected(event))) => (None, format!("credentials rejected ({event})")),
            Some(Err(AdminFailure::Unreachable(message))) | Some(Err(AdminFailure::Failed(message))) => {
                (None, message.clone())
            }
        };
        Self {
            status,
            port_open: polled.port_open,
            version,
            message,
        }
    }
}

/// Connect to the admin port and, if it is open, run `version`.
pub async fn query_server(
    instance: &ServerInstance,
    admin: &dyn ServerAdmin,
    connect_timeout: Duration,
) -> PollResult {
    if !port_in_use(&instance.host, instance.admin_port, connect_timeout).await {
        return PollResult::closed();
    }

    let result = admin
        .exec(&AdminTarget::from(instance), AdminCommand::Version)
        .await;
    trace!("Version query of '{}': {result:?}", instance.name);

    if let Some(event) = result.auth_failure {
        return PollResult::failed(AdminFailure::AuthRejected(event));
    }
    if result.unreachable {
        return PollResult::failed(AdminFailure::Unreachable(result.message));
    }
    if result.is_completed() && !result.message.trim().is_empty() {
        return PollResult::answered(result.message);
    }
    PollResult::failed(AdminFailure::Failed(result.message))
}

/// Classify one poll.
///
/// A rejected login only counts as our server when something already
/// suggested it is ours (an earlier live status or a tracked process).
pub fn classify(
    previous: ServerStatus,
    polled: &PollResult,
    expected_version: Option<&str>,
    process_alive: bool,
) -> ServerStatus {
    use ServerStatus::*;

    let version = match (&polled.version, polled.port_open) {
        (_, false) | (None, _) => return Offline,
        (Some(version), true) => version,
    };

    match version {
        Ok(reported) if versions_match(expected_version, reported) => Online,
        Ok(_) => Offline,
        Err(AdminFailure::AuthRejected(_)) => {
            if matches!(previous, Online | Startup | Shutdown) || process_alive {
                Online
            } else {
                Offline
            }
        }
        Err(_) => match previous {
            Online | Shutdown => Shutdown,
            Startup => Startup,
            _ if process_alive => Startup,
            _ => Offline,
        },
    }
}
