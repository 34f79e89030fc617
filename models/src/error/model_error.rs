use crate::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Property Error: '{key}' has invalid value '{value}' {location}")]
    Property {
        key: String,
        value: String,
        location: ErrorLocation,
    },
}
