pub mod builder;
pub mod keys;

use crate::ErrorLocation;
use crate::error::model_error::ModelError;

use common::RedactedPassword;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::path::PathBuf;
use std::str::FromStr;

use builder::ServerInstanceBuilder;
use keys::*;

pub const DEFAULT_HOST_NAME: &str = "localhost";
pub const DEFAULT_ADMIN_NAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "";
/// Default password of domains created by old server releases.
pub const OLD_DEFAULT_ADMIN_PASSWORD: &str = "adminadmin";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_ADMIN_PORT: u16 = 4848;
pub const DEFAULT_DEBUG_PORT: u16 = 9009;
pub const DEFAULT_DOMAIN_NAME: &str = "domain1";
pub const DEFAULT_DOMAINS_FOLDER: &str = "domains";

#[cfg(windows)]
pub const LOWEST_USER_PORT: u16 = 1;
#[cfg(not(windows))]
pub const LOWEST_USER_PORT: u16 = 1025;

/// How the server JVM is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JvmMode {
    #[default]
    Normal,
    Debug,
    Profile,
}

impl JvmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JvmMode::Normal => "normal",
            JvmMode::Debug => "debug",
            JvmMode::Profile => "profile",
        }
    }
}

impl FromStr for JvmMode {
    type Err = ModelError;

    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "normal" => Ok(JvmMode::Normal),
            "debug" => Ok(JvmMode::Debug),
            "profile" => Ok(JvmMode::Profile),
            _ => Err(ModelError::Property {
                key: JVM_MODE_ATTR.to_string(),
                value: value.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl Display for JvmMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(self.as_str())
    }
}

/// Descriptor of one server installation/domain.
///
/// Built through [`ServerInstanceBuilder`] or restored from the persisted
/// property map with [`ServerInstance::from_properties`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInstance {
    pub name: String,
    pub host: String,
    pub http_port: u16,
    pub admin_port: u16,
    pub admin_secure: bool,
    pub admin_user: String,
    pub admin_password: Option<RedactedPassword>,
    pub server_root: Option<PathBuf>,
    pub server_home: Option<PathBuf>,
    pub domains_dir: Option<PathBuf>,
    pub domain_name: String,
    pub wsl: bool,
    pub docker: bool,
    pub target: Option<String>,
    pub url: Option<String>,
    pub java_home: Option<PathBuf>,
    pub jvm_mode: JvmMode,
    pub jvm_args: Vec<String>,
    pub debug_port: u16,
    /// Version string the DAS on the admin port is expected to report.
    pub version: Option<String>,
}

impl ServerInstance {
    pub fn builder() -> ServerInstanceBuilder {
        ServerInstanceBuilder::default()
    }

    /// Instances without a local domains folder, or running under WSL,
    /// cannot be started or killed from here.
    pub fn is_remote(&self) -> bool {
        self.domains_dir.is_none() || self.wsl
    }

    pub fn domain_dir(&self) -> Option<PathBuf> {
        self.domains_dir
            .as_ref()
            .map(|dir| dir.join(&self.domain_name))
    }

    pub fn server_log_path(&self) -> Option<PathBuf> {
        self.domain_dir()
            .map(|dir| dir.join("logs").join("server.log"))
    }

    pub fn admin_base_url(&self) -> String {
        let scheme = if self.admin_secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.admin_port)
    }

    /// Password or the default empty password.
    pub fn password_or_default(&self) -> RedactedPassword {
        self.admin_password
            .clone()
            .unwrap_or_else(|| RedactedPassword::new(DEFAULT_ADMIN_PASSWORD))
    }

    /// Flatten into the persisted property map. The password is never part of
    /// it; it lives in the secret store.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        props.insert(DISPLAY_NAME_ATTR.to_string(), self.name.clone());
        props.insert(HOSTNAME_ATTR.to_string(), self.host.clone());
        props.insert(HTTPPORT_ATTR.to_string(), self.http_port.to_string());
        props.insert(ADMINPORT_ATTR.to_string(), self.admin_port.to_string());
        props.insert(ADMIN_SECURE_ATTR.to_string(), self.admin_secure.to_string());
        props.insert(USERNAME_ATTR.to_string(), self.admin_user.clone());
        props.insert(DOMAIN_NAME_ATTR.to_string(), self.domain_name.clone());
        props.insert(WSL_ATTR.to_string(), self.wsl.to_string());
        props.insert(DOCKER_ATTR.to_string(), self.docker.to_string());
        props.insert(JVM_MODE_ATTR.to_string(), self.jvm_mode.to_string());
        props.insert(DEBUG_PORT_ATTR.to_string(), self.debug_port.to_string());

        let optional_paths = [
            (INSTALL_FOLDER_ATTR, &self.server_root),
            (PAYARA_FOLDER_ATTR, &self.server_home),
            (DOMAINS_FOLDER_ATTR, &self.domains_dir),
            (JAVA_HOME_ATTR, &self.java_home),
        ];
        for (key, path) in optional_paths {
            if let Some(path) = path {
                props.insert(key.to_string(), path.display().to_string());
            }
        }

        let optional_strings = [
            (TARGET_ATTR, &self.target),
            (URL_ATTR, &self.url),
            (VERSION_ATTR, &self.version),
        ];
        for (key, value) in optional_strings {
            if let Some(value) = value {
                props.insert(key.to_string(), value.clone());
            }
        }

        if !self.jvm_args.is_empty() {
            props.insert(JVM_ARGS_ATTR.to_string(), self.jvm_args.join(" "));
        }

        props
    }

    /// Rebuild a descriptor from its persisted properties.
    ///
    /// Missing numeric properties fall back to their defaults; present but
    /// unparsable ones are rejected.
    #[track_caller]
    pub fn from_properties(
        props: &BTreeMap<String, String>,
        password: Option<RedactedPassword>,
    ) -> Result<Self, ModelError> {
        let get = |key: &str| props.get(key).filter(|v| !v.is_empty()).cloned();

        let mut builder = ServerInstanceBuilder::default();

        if let Some(name) = get(DISPLAY_NAME_ATTR) {
            builder = builder.with_name(name);
        }
        if let Some(host) = get(HOSTNAME_ATTR) {
            builder = builder.with_host(host);
        }
        if let Some(port) = parse_prop::<u16>(props, HTTPPORT_ATTR)? {
            builder = builder.with_http_port(port);
        }
        if let Some(port) = parse_prop::<u16>(props, ADMINPORT_ATTR)? {
            builder = builder.with_admin_port(port);
        }
        if let Some(secure) = parse_prop::<bool>(props, ADMIN_SECURE_ATTR)? {
            builder = builder.with_admin_secure(secure);
        }
        if let Some(user) = get(USERNAME_ATTR) {
            builder = builder.with_admin_user(user);
        }
        if let Some(password) = password {
            builder = builder.with_admin_password(password);
        }
        if let Some(root) = get(INSTALL_FOLDER_ATTR) {
            builder = builder.with_server_root(root);
        }
        if let Some(home) = get(PAYARA_FOLDER_ATTR) {
            builder = builder.with_server_home(home);
        }
        if let Some(domains) = get(DOMAINS_FOLDER_ATTR) {
            builder = builder.with_domains_dir(domains);
        }
        if let Some(domain) = get(DOMAIN_NAME_ATTR) {
            builder = builder.with_domain_name(domain);
        }
        if let Some(wsl) = parse_prop::<bool>(props, WSL_ATTR)? {
            builder = builder.with_wsl(wsl);
        }
        if let Some(docker) = parse_prop::<bool>(props, DOCKER_ATTR)? {
            builder = builder.with_docker(docker);
        }
        if let Some(target) = get(TARGET_ATTR) {
            builder = builder.with_target(target);
        }
        if let Some(url) = get(URL_ATTR) {
            builder = builder.with_url(url);
        }
        if let Some(java_home) = get(JAVA_HOME_ATTR) {
            builder = builder.with_java_home(java_home);
        }
        if let Some(mode) = get(JVM_MODE_ATTR) {
            builder = builder.with_jvm_mode(mode.parse()?);
        }
        if let Some(args) = get(JVM_ARGS_ATTR) {
            builder = builder.with_jvm_args(args.split_whitespace().map(String::from));
        }
        if let Some(port) = get(DEBUG_PORT_ATTR) {
            // Garbage debug ports are normalised by the builder, not rejected.
            builder = builder.with_debug_port(port.trim().parse().unwrap_or(0));
        }
        if let Some(version) = get(VERSION_ATTR) {
            builder = builder.with_version(version);
        }

        builder.build()
    }
}

#[track_caller]
fn parse_prop<T: FromStr>(
    props: &BTreeMap<String, String>,
    key: &str,
) -> Result<Option<T>, ModelError> {
    match props.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| ModelError::Property {
            key: key.to_string(),
            value: raw.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Extract the host from a deployer URL such as
/// `[/opt/payara6]deployer:pfv6ee10:localhost:4848`.
pub fn host_from_url(url: &str) -> Option<String> {
    let (_, tail) = url.split_once(']')?;
    tail.split(':')
        .nth(2)
        .filter(|host| !host.is_empty())
        .map(String::from)
}
