//! Geocoding provider error types.
//!
//! These never reach callers of the resolver: each provider converts them
//! into a logged warning and an absent result at its own boundary.

/// Errors that can occur when calling a geocoding provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// HTTP request failed (connection refused, DNS, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Provider answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("malformed response: {message}")]
    Malformed { message: String },

    /// Client could not be constructed
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(err)
        }
    }
}
