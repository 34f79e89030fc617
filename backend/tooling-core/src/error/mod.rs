pub mod admin;
pub mod config;
pub mod log_view;
pub mod process;
pub mod registry;
pub mod status;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Admin(#[from] admin::AdminError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    LogView(#[from] log_view::LogViewError),

    #[error(transparent)]
    Process(#[from] process::ProcessError),

    #[error(transparent)]
    Registry(#[from] registry::RegistryError),

    #[error(transparent)]
    Status(#[from] status::StatusError),
}
