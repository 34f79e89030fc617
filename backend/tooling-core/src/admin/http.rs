use crate::admin::{AdminCommand, AdminResult, AdminTarget, ServerAdmin};
use crate::error::admin::AdminError;
use crate::{ADMIN_ENDPOINT_PREFIX, ADMIN_REQUESTED_BY};

use common::{ErrorLocation, HttpStatusCode};

use models::TaskEvent;

use std::collections::BTreeMap;
use std::panic::Location;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Deserialize;
use url::Url;

const REQUESTED_BY_HEADER_KEY: &str = "X-Requested-By";
const EXIT_CODE_SUCCESS: &str = "SUCCESS";
const EXIT_CODE_WARNING: &str = "WARNING";
const AUTH_FAILURE_MARKER: &str = "authentication";

/// Body returned by the `__asadmin` listener for `Accept: application/json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminResponse {
    pub message: String,
    pub exit_code: String,
    #[serde(rename = "extraProperties")]
    pub extra_properties: BTreeMap<String, serde_json::Value>,
}

impl AdminResponse {
    fn is_success(&self) -> bool {
        self.exit_code.eq_ignore_ascii_case(EXIT_CODE_SUCCESS)
            || self.exit_code.eq_ignore_ascii_case(EXIT_CODE_WARNING)
    }

    fn flat_properties(&self) -> BTreeMap<String, String> {
        self.extra_properties
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// [`ServerAdmin`] over the server's HTTP admin listener.
#[derive(Clone)]
pub struct HttpServerAdmin {
    client: Client,
}

impl HttpServerAdmin {
    pub fn new(timeout: Duration) -> Result<Self, AdminError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            // Admin listeners commonly run with a self-signed certificate.
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client })
    }

    pub(crate) fn command_url(target: &AdminTarget, command: AdminCommand) -> Result<Url, AdminError> {
        let base = Url::parse(&target.base_url())?;
        Ok(base.join(&format!("{ADMIN_ENDPOINT_PREFIX}/{}", command.name()))?)
    }

    async fn send(&self, target: &AdminTarget, command: AdminCommand) -> Result<AdminResult, AdminError> {
        let url = Self::command_url(target, command)?;
        trace!("Admin request: {url}");

        let response = self
            .client
            .get(url)
            .basic_auth(&target.user, Some(target.password.expose()))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(REQUESTED_BY_HEADER_KEY, ADMIN_REQUESTED_BY)
            .send()
            .await?;

        let status_code = HttpStatusCode::from(response.status().as_u16());

        if status_code.is_auth_rejection() {
            let event = if status_code.0 == 401 {
                TaskEvent::AuthFailedHttp
            } else {
                TaskEvent::AuthFailed
            };
            debug!("Admin command '{command}' rejected credentials: HTTP {status_code}");
            return Ok(AdminResult::auth_rejected(
                event,
                format!("HTTP {status_code}: credentials rejected for user '{}'", target.user),
            ));
        }

        if status_code.is_transient() {
            debug!("Admin command '{command}' answered HTTP {status_code}: server not ready");
            return Ok(AdminResult::failed(format!(
                "HTTP {status_code}: server is starting up or shutting down"
            )));
        }

        if !response.status().is_success() {
            return Err(AdminError::Server {
                status_code,
                message: response.text().await.unwrap_or_default(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body = response.text().await?;
        let parsed: AdminResponse = serde_json::from_str(&body)?;

        Ok(interpret(command, parsed))
    }
}

pub(crate) fn interpret(command: AdminCommand, response: AdminResponse) -> AdminResult {
    if response.is_success() {
        let properties = response.flat_properties();
        return AdminResult::completed(response.message.trim()).with_properties(properties);
    }

    if response.message.to_lowercase().contains(AUTH_FAILURE_MARKER) {
        return AdminResult::auth_rejected(TaskEvent::AuthFailed, response.message.trim());
    }

    debug!(
        "Admin command '{command}' failed: exit_code={} message={}",
        response.exit_code, response.message
    );
    AdminResult::failed(response.message.trim())
}

#[async_trait]
impl ServerAdmin for HttpServerAdmin {
    async fn exec(&self, target: &AdminTarget, command: AdminCommand) -> AdminResult {
        match self.send(target, command).await {
            Ok(result) => result,
            Err(e) if e.is_unreachable() => {
                debug!("Admin endpoint {} unreachable: {e}", target.base_url());
                AdminResult::unreachable(e.to_string())
            }
            Err(e) => {
                debug!("Admin command '{command}' failed: {e}");
                AdminResult::failed(e.to_string())
            }
        }
    }
}
