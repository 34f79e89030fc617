use crate::error::model_error::ModelError;
use crate::server_instance::{
    DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PORT, DEFAULT_DEBUG_PORT, DEFAULT_DOMAIN_NAME,
    DEFAULT_HOST_NAME, DEFAULT_HTTP_PORT, JvmMode, LOWEST_USER_PORT, ServerInstance,
    host_from_url,
};
use crate::ErrorLocation;

use common::RedactedPassword;

use std::panic::Location;
use std::path::PathBuf;

/// Builder for creating validated ServerInstance descriptors.
///
/// Everything but the name has a default matching a freshly created local
/// domain (`localhost`, ports 8080/4848, user `admin`, `domain1`).
#[derive(Debug, Default)]
pub struct ServerInstanceBuilder {
    name: Option<String>,
    host: Option<String>,
    http_port: Option<u16>,
    admin_port: Option<u16>,
    admin_secure: Option<bool>,
    admin_user: Option<String>,
    admin_password: Option<RedactedPassword>,
    server_root: Option<PathBuf>,
    server_home: Option<PathBuf>,
    domains_dir: Option<PathBuf>,
    domain_name: Option<String>,
    wsl: Option<bool>,
    docker: Option<bool>,
    target: Option<String>,
    url: Option<String>,
    java_home: Option<PathBuf>,
    jvm_mode: Option<JvmMode>,
    jvm_args: Vec<String>,
    debug_port: Option<u16>,
    version: Option<String>,
}

impl ServerInstanceBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = Some(port);
        self
    }

    pub fn with_admin_port(mut self, port: u16) -> Self {
        self.admin_port = Some(port);
        self
    }

    pub fn with_admin_secure(mut self, secure: bool) -> Self {
        self.admin_secure = Some(secure);
        self
    }

    pub fn with_admin_user(mut self, user: impl Into<String>) -> Self {
        self.admin_user = Some(user.into());
        self
    }

    pub fn with_admin_password(mut self, password: RedactedPassword) -> Self {
        self.admin_password = Some(password);
        self
    }

    pub fn with_server_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.server_root = Some(root.into());
        self
    }

    pub fn with_server_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.server_home = Some(home.into());
        self
    }

    pub fn with_domains_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.domains_dir = Some(dir.into());
        self
    }

    pub fn with_domain_name(mut self, name: impl Into<String>) -> Self {
        self.domain_name = Some(name.into());
        self
    }

    pub fn with_wsl(mut self, wsl: bool) -> Self {
        self.wsl = Some(wsl);
        self
    }

    pub fn with_docker(mut self, docker: bool) -> Self {
        self.docker = Some(docker);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_java_home(mut self, java_home: impl Into<PathBuf>) -> Self {
        self.java_home = Some(java_home.into());
        self
    }

    pub fn with_jvm_mode(mut self, mode: JvmMode) -> Self {
        self.jvm_mode = Some(mode);
        self
    }

    pub fn with_jvm_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.jvm_args = args.into_iter().collect();
        self
    }

    pub fn with_debug_port(mut self, port: u16) -> Self {
        self.debug_port = Some(port);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Build the ServerInstance with validation.
    ///
    /// The host falls back to the one embedded in the deployer URL, then to
    /// `localhost`. A debug port outside the user port range is replaced with
    /// the default debug port instead of failing the build.
    #[track_caller]
    pub fn build(self) -> Result<ServerInstance, ModelError> {
        let name = self.name.ok_or_else(|| ModelError::Validation {
            message: String::from("Instance name is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if name.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Instance name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let host = self
            .host
            .filter(|h| !h.trim().is_empty())
            .or_else(|| self.url.as_deref().and_then(host_from_url))
            .unwrap_or_else(|| DEFAULT_HOST_NAME.to_string());

        let http_port = self.http_port.unwrap_or(DEFAULT_HTTP_PORT);
        let admin_port = self.admin_port.unwrap_or(DEFAULT_ADMIN_PORT);

        if http_port == 0 || admin_port == 0 {
            return Err(ModelError::Validation {
                message: format!("Ports must be non-zero (http={http_port}, admin={admin_port})"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if http_port == admin_port {
            return Err(ModelError::Validation {
                message: format!("HTTP and admin port cannot both be {admin_port}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let admin_user = self
            .admin_user
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());

        let domain_name = self
            .domain_name
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DOMAIN_NAME.to_string());

        if domain_name.contains(['/', '\\']) {
            return Err(ModelError::Validation {
                message: format!("Domain name cannot contain path separators: {domain_name}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let debug_port = match self.debug_port {
            Some(port) if port >= LOWEST_USER_PORT => port,
            _ => DEFAULT_DEBUG_PORT,
        };

        Ok(ServerInstance {
            name,
            host,
            http_port,
            admin_port,
            admin_secure: self.admin_secure.unwrap_or(false),
            admin_user,
            admin_password: self.admin_password,
            server_root: self.server_root,
            server_home: self.server_home,
            domains_dir: self.domains_dir,
            domain_name,
            wsl: self.wsl.unwrap_or(false),
            docker: self.docker.unwrap_or(false),
            target: self.target,
            url: self.url,
            java_home: self.java_home,
            jvm_mode: self.jvm_mode.unwrap_or_default(),
            jvm_args: self.jvm_args,
            debug_port,
            version: self.version,
        })
    }
}
