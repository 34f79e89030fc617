use crate::error::process::ProcessError;
use crate::process::ServerProcess;

use common::ErrorLocation;

use models::{JvmMode, ServerInstance};

use std::env;
use std::ffi::OsString;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, info};
use tokio::process::Command as TokioCommand;

const JAVA_HOME_ENV: &str = "JAVA_HOME";
#[cfg(windows)]
const JAVA_BINARY: &str = "java.exe";
#[cfg(not(windows))]
const JAVA_BINARY: &str = "java";
const BOOTSTRAP_JAR: &str = "glassfish.jar";
const MODULES_DIR: &str = "modules";
const GLASSFISH_DIR: &str = "glassfish";
const DOMAIN_NAME_FLAG: &str = "-domainname";
const DOMAIN_DIR_FLAG: &str = "-domaindir";

/// Starts the local server process of an instance.
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, instance: &ServerInstance) -> Result<ServerProcess, ProcessError>;
}

/// Launches the domain admin server JVM directly from the installation's
/// bootstrap jar with stdout and stderr piped for the log view.
#[derive(Debug, Default, Clone)]
pub struct JvmLauncher;

impl JvmLauncher {
    pub(crate) fn java_binary(instance: &ServerInstance) -> PathBuf {
        let java_home = instance
            .java_home
            .clone()
            .or_else(|| env::var_os(JAVA_HOME_ENV).map(PathBuf::from));

        match java_home {
            Some(home) => home.join("bin").join(JAVA_BINARY),
            None => PathBuf::from(JAVA_BINARY),
        }
    }

    #[track_caller]
    pub(crate) fn bootstrap_jar(instance: &ServerInstance) -> Result<PathBuf, ProcessError> {
        if let Some(home) = &instance.server_home {
            return Ok(home.join(MODULES_DIR).join(BOOTSTRAP_JAR));
        }
        if let Some(root) = &instance.server_root {
            return Ok(root.join(GLASSFISH_DIR).join(MODULES_DIR).join(BOOTSTRAP_JAR));
        }
        Err(ProcessError::Configuration {
            message: format!("Instance '{}' has no server home or install root", instance.name),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Full argument list after the `java` binary.
    #[track_caller]
    pub fn arguments(instance: &ServerInstance) -> Result<Vec<OsString>, ProcessError> {
        let domain_dir = instance.domain_dir().ok_or_else(|| ProcessError::Configuration {
            message: format!("Instance '{}' has no local domains folder", instance.name),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mut args: Vec<OsString> = Vec::new();

        if instance.jvm_mode == JvmMode::Debug {
            args.push(OsString::from(format!(
                "-agentlib:jdwp=transport=dt_socket,address={},server=y,suspend=n",
                instance.debug_port
            )));
        }

        args.extend(instance.jvm_args.iter().map(OsString::from));
        args.push(OsString::from("-jar"));
        args.push(Self::bootstrap_jar(instance)?.into_os_string());
        args.push(OsString::from(DOMAIN_NAME_FLAG));
        args.push(OsString::from(&instance.domain_name));
        args.push(OsString::from(DOMAIN_DIR_FLAG));
        args.push(domain_dir.into_os_string());

        Ok(args)
    }

    fn working_dir(instance: &ServerInstance) -> Option<&Path> {
        instance
            .server_home
            .as_deref()
            .or(instance.server_root.as_deref())
    }
}

impl ProcessLauncher for JvmLauncher {
    fn launch(&self, instance: &ServerInstance) -> Result<ServerProcess, ProcessError> {
        if instance.is_remote() {
            return Err(ProcessError::Configuration {
                message: format!("Instance '{}' is remote and cannot be launched", instance.name),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let java = Self::java_binary(instance);
        let args = Self::arguments(instance)?;

        debug!(
            "Launching {} {}",
            java.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut cmd = TokioCommand::new(&java);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = Self::working_dir(instance) {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| ProcessError::Spawn {
            message: format!("Failed to launch {}: {e}", java.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;

        info!(
            "Launched server '{}' (PID: {:?})",
            instance.name,
            child.id()
        );

        Ok(ServerProcess::from_child(child))
    }
}
