//! Admin password handling with redacted Debug output.

use crate::{ErrorLocation, RedactError};

use std::fmt;
use std::panic::Location;

use serde::ser::Error;
use zeroize::Zeroize;

/// A server admin password that never exposes its value in logs or debug output.
///
/// Payara domains created with default settings use an empty admin password,
/// so an empty value is legal and distinct from "no password configured".
#[derive(Clone, PartialEq, Eq)]
pub struct RedactedPassword {
    inner: String,
}

impl RedactedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            inner: password.into(),
        }
    }

    /// Get the actual password for the admin request.
    ///
    /// # Security Note
    /// Only call this when building the Authorization header or handing the
    /// value to a secret store.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for RedactedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedactedPassword([REDACTED])")
    }
}

impl fmt::Display for RedactedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED PASSWORD]")
    }
}

impl Drop for RedactedPassword {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

// Passwords only leave the process through a secret store.
impl serde::Serialize for RedactedPassword {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(RedactError::Serialization {
            message: String::from(
                "RedactedPassword cannot be serialized - use expose() explicitly",
            ),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}
