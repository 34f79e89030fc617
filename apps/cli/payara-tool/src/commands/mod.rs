pub mod instances;
pub mod lifecycle;
pub mod logs;
pub mod status;

use crate::ADMIN_PASSWORD_ENV;
use crate::cli::Commands;
use crate::error::PayaraToolError;
use crate::output::ConsoleSink;

use common::RedactedPassword;
use tooling_core::config::ToolingConfig;
use tooling_core::manager::ToolingManager;
use tooling_core::registry::store::InstanceStore;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use log::debug;

/// Admin password from the environment (or a `.env` file loaded at startup).
pub fn env_password() -> Option<RedactedPassword> {
    std::env::var(ADMIN_PASSWORD_ENV)
        .ok()
        .filter(|value| !value.is_empty())
        .map(RedactedPassword::new)
}

/// Build a manager over the instances persisted in `config_dir`.
pub fn open_manager(config_dir: &Path) -> Result<ToolingManager, PayaraToolError> {
    let config = ToolingConfig::load(config_dir)?;
    let manager = ToolingManager::builder()
        .with_config(config)
        .with_store(InstanceStore::in_dir(config_dir))
        .with_sink(Arc::new(ConsoleSink::new()))
        .build()?;

    // Passwords are not persisted across runs; the environment supplies them.
    if let Some(password) = env_password() {
        apply_password(&manager, &password);
    }
    Ok(manager)
}

pub(crate) fn apply_password(manager: &ToolingManager, password: &RedactedPassword) {
    for instance in manager.instances() {
        if instance.props().password().is_none() {
            debug!("Using {ADMIN_PASSWORD_ENV} for '{}'", instance.name());
            instance.props().set_password(password.clone());
        }
    }
}

pub async fn run(command: Commands, config_dir: &Path) -> Result<ExitCode, PayaraToolError> {
    let manager = open_manager(config_dir)?;

    let result = match command {
        Commands::Add(args) => instances::add(&manager, args),
        Commands::List => instances::list(&manager),
        Commands::Remove { name } => instances::remove(&manager, &name),
        Commands::Status { name } => status::run(&manager, name.as_deref()).await,
        Commands::Start { name, follow } => lifecycle::start(&manager, &name, follow).await,
        Commands::Stop { name } => lifecycle::stop(&manager, &name).await,
        Commands::Restart { name, follow } => lifecycle::restart(&manager, &name, follow).await,
        Commands::Kill { name } => lifecycle::kill(&manager, &name).await,
        Commands::Logs { name, follow } => logs::run(&manager, &name, follow).await,
    };

    manager.shutdown();
    result
}
