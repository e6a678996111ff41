//! Session manager errors.

use thiserror::Error;

use crate::{http::ApiError, storage::StorageError};

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the supplied email/password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// No usable refresh token remains; the session has been torn down.
    #[error("session expired")]
    SessionExpired,

    /// The API call itself failed.
    #[error("api error")]
    Api(#[source] ApiError),

    /// Reading persisted session state failed.
    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl From<ApiError> for AuthError {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}
