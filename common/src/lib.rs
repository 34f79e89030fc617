//! Shared primitives for the Payara tooling workspace.
//!
//! Everything here is free of tooling behaviour: error location tracking,
//! HTTP status categorisation for the admin client, and the redacted password
//! wrapper that keeps admin credentials out of logs.

pub mod error;
pub mod http_status;
pub mod redacted_password;


pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_password::RedactedPassword;
