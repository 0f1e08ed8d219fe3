//! API client error types.

use thiserror::Error;

/// Result type alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors raised while talking to the PVE API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {reason}")]
    Status {
        path: String,
        status: u16,
        reason: String,
    },

    #[error("failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },
}
