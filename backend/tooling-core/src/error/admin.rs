use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AdminError {
    #[error("HTTP Error: {message} {location}")]
    Http {
        message: String,
        is_connect: bool,
        is_timeout: bool,
        location: ErrorLocation,
    },

    #[error("JSON Error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Admin Endpoint Error: HTTP {status_code} - {message} {location}")]
    Server {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },
}

impl AdminError {
    /// Nothing answered on the admin port.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            AdminError::Http {
                is_connect: true,
                ..
            } | AdminError::Http {
                is_timeout: true,
                ..
            }
        )
    }
}

impl From<url::ParseError> for AdminError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        AdminError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for AdminError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        AdminError::Http {
            message: error.to_string(),
            is_connect: error.is_connect(),
            is_timeout: error.is_timeout(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for AdminError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        AdminError::Json {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
