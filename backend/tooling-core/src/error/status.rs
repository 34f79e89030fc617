use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StatusError {
    #[error("Monitoring Error: {message} {location}")]
    Monitoring {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not Monitored Error: '{instance}' has no status poller {location}")]
    NotMonitored {
        instance: String,
        location: ErrorLocation,
    },
}
