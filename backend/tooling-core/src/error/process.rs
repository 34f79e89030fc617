use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProcessError {
    #[error("Spawn Error: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Network Query Error: {message} {location}")]
    NetworkQuery {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Launch Configuration Error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Kill Error: {message} {location}")]
    Kill {
        message: String,
        location: ErrorLocation,
    },
}
