use tooling_core::error::CoreError;
use tooling_core::error::config::ConfigError;
use tooling_core::error::registry::RegistryError;

use common::ErrorLocation;

use models::ModelError;

use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum PayaraToolError {
    /// Error from this CLI
    #[error("Payara Tool Error: {message} {location}")]
    Tool {
        message: String,
        location: ErrorLocation,
    },

    /// Logger could not be set up
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Error from tooling-core (registry, status, lifecycle, logs)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid instance descriptor
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<ConfigError> for PayaraToolError {
    fn from(error: ConfigError) -> Self {
        PayaraToolError::Core(CoreError::Config(error))
    }
}

impl From<RegistryError> for PayaraToolError {
    fn from(error: RegistryError) -> Self {
        PayaraToolError::Core(CoreError::Registry(error))
    }
}
