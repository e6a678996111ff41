//! Request/response types and the transport seam.

use async_trait::async_trait;
use mockall::automock;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{config::ClientConfig, http::ApiError};

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Idempotent read.
    Get,

    /// Mutating call with an optional JSON body.
    Post,
}

/// A single API request, independent of any HTTP library.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,

    /// Path relative to the API base URL, starting with `/`.
    pub path: String,

    /// JSON body, sent for `Post` requests when present.
    pub body: Option<Value>,

    /// Whether the request must carry a bearer token and participates in
    /// the refresh-and-retry protocol.
    pub requires_auth: bool,
}

impl ApiRequest {
    /// Build an unauthenticated GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            requires_auth: false,
        }
    }

    /// Build an unauthenticated POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            requires_auth: false,
        }
    }

    /// Mark the request as requiring bearer authentication.
    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// A raw API response: status code plus parsed JSON body.
///
/// Non-JSON bodies are preserved as JSON strings; empty bodies become
/// `null`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body.
    pub body: Value,
}

impl ApiResponse {
    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the server reported the request as unauthorized.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Deserialize the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone()).map_err(ApiError::Decode)
    }

    /// Convert a non-2xx response into [`ApiError::Server`], preferring
    /// the server-provided `message` field when the body carries one.
    #[must_use]
    pub fn into_server_error(self) -> ApiError {
        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| "request failed".to_owned(), ToOwned::to_owned);

        ApiError::Server {
            status: self.status,
            message,
        }
    }
}

/// The seam between the engine and whatever actually speaks HTTP.
///
/// Implementations report every received response as `Ok`, including
/// non-2xx statuses; `Err` means no response arrived at all. What to do
/// with an error status is the caller's decision.
#[automock]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue `request`, attaching `bearer` as an `Authorization: Bearer`
    /// header when present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response arrived at all.
    async fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> Result<ApiResponse, ApiError>;
}

/// Production transport over a [`reqwest::Client`] with the fixed
/// request timeout from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, body })
    }
}
