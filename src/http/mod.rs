//! HTTP plumbing.
//!
//! The API is consumed through three layers: [`HttpTransport`] issues a
//! single request and reports the raw response, [`ReqwestTransport`] is
//! its production implementation, and [`ApiClient`] decorates a transport
//! with bearer-token injection and the single refresh-and-retry rule.

mod client;
mod errors;
mod transport;

pub use client::ApiClient;
pub use errors::ApiError;
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, Method, MockHttpTransport, ReqwestTransport,
};
