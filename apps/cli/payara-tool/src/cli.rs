use crate::logger::level_for_verbosity;

use common::RedactedPassword;

use models::server_instance::{
    DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PORT, DEFAULT_DOMAIN_NAME, DEFAULT_HTTP_PORT,
};
use models::{JvmMode, ModelError, ServerInstance};

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "payara-tool")]
#[command(about = "Register, start, stop and watch Payara Server domains")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.json, instances.toml and the log file
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        level_for_verbosity(self.verbose)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register a server instance
    Add(AddArgs),

    /// List registered instances
    List,

    /// Unregister an instance
    Remove { name: String },

    /// Poll the status of one or all instances
    Status { name: Option<String> },

    /// Start an instance and wait until it is online
    Start {
        name: String,

        /// Keep following server.log once the server is up
        #[arg(short, long)]
        follow: bool,
    },

    /// Stop an instance through its admin listener
    Stop { name: String },

    /// Stop, then start an instance
    Restart {
        name: String,

        /// Keep following server.log once the server is up
        #[arg(short, long)]
        follow: bool,
    },

    /// Kill the server process started by this tool
    Kill { name: String },

    /// Print the server.log of a local instance
    Logs {
        name: String,

        /// Keep following the file until interrupted
        #[arg(short, long)]
        follow: bool,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Display name, unique among registered instances
    pub name: String,

    /// Defaults to the host of `--url`, then localhost
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long, default_value_t = DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    #[arg(long, default_value_t = DEFAULT_ADMIN_PORT)]
    pub admin_port: u16,

    /// Talk to the admin listener over HTTPS
    #[arg(long)]
    pub secure: bool,

    /// Admin user; the password is read from PAYARA_ADMIN_PASSWORD
    #[arg(long, default_value = DEFAULT_ADMIN_NAME)]
    pub user: String,

    /// Installation root (the folder containing `glassfish/`)
    #[arg(long)]
    pub install_root: Option<PathBuf>,

    /// Server home (the `glassfish/` folder)
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Folder holding the domains; without it the instance is remote
    #[arg(long)]
    pub domains_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_DOMAIN_NAME)]
    pub domain: String,

    #[arg(long)]
    pub java_home: Option<PathBuf>,

    /// normal, debug or profile
    #[arg(long, default_value = "normal")]
    pub jvm_mode: JvmMode,

    /// Extra JVM option, repeatable
    #[arg(long = "jvm-arg", allow_hyphen_values = true)]
    pub jvm_args: Vec<String>,

    #[arg(long)]
    pub debug_port: Option<u16>,

    /// Version string the server must report to be considered this instance
    #[arg(long)]
    pub expect_version: Option<String>,

    /// Deployer URL such as `[/opt/payara6]deployer:pfv6ee10:localhost:4848`
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub wsl: bool,

    #[arg(long)]
    pub docker: bool,
}

impl AddArgs {
    pub fn descriptor(self, password: Option<RedactedPassword>) -> Result<ServerInstance, ModelError> {
        let mut builder = ServerInstance::builder()
            .with_name(self.name)
            .with_http_port(self.http_port)
            .with_admin_port(self.admin_port)
            .with_admin_secure(self.secure)
            .with_admin_user(self.user)
            .with_domain_name(self.domain)
            .with_jvm_mode(self.jvm_mode)
            .with_jvm_args(self.jvm_args)
            .with_wsl(self.wsl)
            .with_docker(self.docker);

        if let Some(host) = self.host {
            builder = builder.with_host(host);
        }
        if let Some(password) = password {
            builder = builder.with_admin_password(password);
        }
        if let Some(root) = self.install_root {
            builder = builder.with_server_root(root);
        }
        if let Some(home) = self.home {
            builder = builder.with_server_home(home);
        }
        if let Some(domains) = self.domains_dir {
            builder = builder.with_domains_dir(domains);
        }
        if let Some(java_home) = self.java_home {
            builder = builder.with_java_home(java_home);
        }
        if let Some(port) = self.debug_port {
            builder = builder.with_debug_port(port);
        }
        if let Some(version) = self.expect_version {
            builder = builder.with_version(version);
        }
        if let Some(url) = self.url {
            builder = builder.with_url(url);
        }

        builder.build()
    }
}
