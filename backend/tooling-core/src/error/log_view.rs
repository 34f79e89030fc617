use common::ErrorLocation;

use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LogViewError {
    #[error("Log File Error: {path}: {source} {location}")]
    Io {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("Log Source Error: {message} {location}")]
    Source {
        message: String,
        location: ErrorLocation,
    },
}
