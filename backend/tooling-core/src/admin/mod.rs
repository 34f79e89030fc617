//! Remote administration of a running server.
//!
//! Lifecycle tasks and the status poller only see the [`ServerAdmin`] trait;
//! [`http::HttpServerAdmin`] talks to the server's `__asadmin` REST listener.

pub mod http;

use common::RedactedPassword;

use models::{ServerInstance, TaskEvent, TaskState};

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FormatResult};

use async_trait::async_trait;

/// Where and as whom an admin command is sent.
#[derive(Debug, Clone)]
pub struct AdminTarget {
    pub host: String,
    pub admin_port: u16,
    pub secure: bool,
    pub user: String,
    pub password: RedactedPassword,
}

impl AdminTarget {
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.admin_port)
    }
}

impl From<&ServerInstance> for AdminTarget {
    fn from(instance: &ServerInstance) -> Self {
        Self {
            host: instance.host.clone(),
            admin_port: instance.admin_port,
            secure: instance.admin_secure,
            user: instance.admin_user.clone(),
            password: instance.password_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Version,
    StopDomain,
    Locations,
}

impl AdminCommand {
    pub fn name(&self) -> &'static str {
        match self {
            AdminCommand::Version => "version",
            AdminCommand::StopDomain => "stop-domain",
            AdminCommand::Locations => "__locations",
        }
    }
}

impl Display for AdminCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(self.name())
    }
}

/// Outcome of one admin command.
///
/// Transport problems are folded into a `Failed` result so callers can treat
/// every answer the same way; `unreachable` tells a dead port apart from a
/// server that answered with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminResult {
    pub state: TaskState,
    pub message: String,
    pub properties: BTreeMap<String, String>,
    /// `AuthFailed` or `AuthFailedHttp` when the credentials were rejected.
    pub auth_failure: Option<TaskEvent>,
    pub unreachable: bool,
}

impl AdminResult {
    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            state: TaskState::Completed,
            message: message.into(),
            properties: BTreeMap::new(),
            auth_failure: None,
            unreachable: false,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: TaskState::Failed,
            message: message.into(),
            properties: BTreeMap::new(),
            auth_failure: None,
            unreachable: false,
        }
    }

    pub fn auth_rejected(event: TaskEvent, message: impl Into<String>) -> Self {
        Self {
            auth_failure: Some(event),
            ..Self::failed(message)
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            unreachable: true,
            ..Self::failed(message)
        }
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.state == TaskState::Completed
    }
}

#[async_trait]
pub trait ServerAdmin: Send + Sync {
    async fn exec(&self, target: &AdminTarget, command: AdminCommand) -> AdminResult;
}

/// Whether the version string reported by a server belongs to the expected
/// installation. With no expectation any non-empty answer is accepted.
pub fn versions_match(expected: Option<&str>, reported: &str) -> bool {
    let reported = reported.trim();
    if reported.is_empty() {
        return false;
    }
    match expected.map(str::trim) {
        None | Some("") => true,
        Some(expected) => reported.contains(expected),
    }
}
