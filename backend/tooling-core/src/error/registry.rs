use common::ErrorLocation;

use models::ModelError;

use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("Duplicate Instance Error: '{name}' is already registered {location}")]
    Duplicate {
        name: String,
        location: ErrorLocation,
    },

    #[error("Instance Not Found Error: '{name}' {location}")]
    NotFound {
        name: String,
        location: ErrorLocation,
    },

    #[error("Instance Store Error: {path}: {reason} {location}")]
    Store {
        path: PathBuf,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Instance Descriptor Error: {source}")]
    Model {
        #[from]
        source: ModelError,
    },
}
