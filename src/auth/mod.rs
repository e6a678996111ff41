//! Session and token lifecycle.
//!
//! [`SessionManager`] owns the process-wide access/refresh token pair and
//! the authenticated user, persisting both through the key-value store.
//! The refresh-and-retry protocol that keeps API calls transparently
//! authenticated lives in [`crate::http::ApiClient`]; this module supplies
//! the token exchange it leans on.

mod errors;
mod models;
mod session;
mod token;

pub use errors::AuthError;
pub use models::UserProfile;
pub use session::SessionManager;
pub use token::{SecretToken, TokenPair};
