//! API error taxonomy.

use thiserror::Error;

/// Errors surfaced by the API call path.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received: connectivity failure or timeout.
    #[error("network error")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status and (where available) a
    /// structured error message.
    #[error("server responded with status {status}: {message}")]
    Server {
        /// HTTP status code of the response.
        status: u16,

        /// Message extracted from the error body, or a generic fallback.
        message: String,
    },

    /// The request was rejected as unauthorized even after the one
    /// permitted refresh-and-retry.
    #[error("session expired")]
    Unauthorized,

    /// The response body did not match the expected shape.
    #[error("malformed response body")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Whether this error came from a connectivity failure rather than a
    /// server verdict, i.e. the operation may succeed if simply retried.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
