//! HTTP status code utilities for admin endpoint error handling.

/// HTTP status code for error categorization.
///
/// Stored directly rather than parsed from error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStatusCode(pub u16);

impl HttpStatusCode {
    /// The admin listener rejected the supplied credentials.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.0, 401 | 403)
    }

    /// Codes a DAS answers with while it is still booting or going down.
    pub fn is_transient(&self) -> bool {
        matches!(self.0, 502 | 503 | 504)
    }
}

impl From<u16> for HttpStatusCode {
    fn from(code: u16) -> Self {
        HttpStatusCode(code)
    }
}

impl std::fmt::Display for HttpStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
