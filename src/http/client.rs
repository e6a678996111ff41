//! Authenticated API client.

use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    auth::SessionManager,
    http::{ApiError, ApiRequest, ApiResponse, HttpTransport},
};

/// Decorates a transport with bearer-token injection and the
/// refresh-and-retry rule.
///
/// A 401 on an authenticated request triggers exactly one token refresh
/// and one replay of the original request. A 401 on the replay clears the
/// session and propagates; the replay is never retried again, so a dead
/// refresh token cannot cause a refresh storm.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionManager>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client over the given transport and session.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, session: Arc<SessionManager>) -> Self {
        Self { transport, session }
    }

    /// Issue a request, attaching the session's access token when the
    /// request requires authentication.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the server rejects the
    /// request even after the one permitted refresh, or the underlying
    /// transport error otherwise. Non-401 error statuses are returned as
    /// `Ok` responses for the caller to interpret.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let bearer = if request.requires_auth {
            self.session.bearer().await
        } else {
            None
        };

        let response = self.transport.execute(request.clone(), bearer).await?;

        if !request.requires_auth || !response.is_unauthorized() {
            return Ok(response);
        }

        if !self.session.has_refresh_token().await {
            return Err(ApiError::Unauthorized);
        }

        debug!(path = %request.path, "access token rejected, refreshing once");

        if self.session.refresh().await.is_err() {
            // refresh() has already torn the session down
            return Err(ApiError::Unauthorized);
        }

        let bearer = self.session.bearer().await;
        let replay = self.transport.execute(request, bearer).await?;

        if replay.is_unauthorized() {
            warn!("replayed request still unauthorized, clearing session");
            self.session.expire().await;
            return Err(ApiError::Unauthorized);
        }

        Ok(replay)
    }

    /// Issue a request and decode a successful JSON response into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] for non-2xx responses and
    /// [`ApiError::Decode`] when the body does not match `T`, in addition
    /// to the failures of [`Self::execute`].
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;

        if !response.is_success() {
            return Err(response.into_server_error());
        }

        response.json()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        http::{Method, MockHttpTransport},
        storage::MemoryStore,
    };

    fn client_with(transport: MockHttpTransport) -> ApiClient {
        let transport: Arc<dyn HttpTransport> = Arc::new(transport);
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(SessionManager::new(Arc::clone(&transport), store));

        ApiClient::new(transport, session)
    }

    #[tokio::test]
    async fn unauthenticated_request_carries_no_bearer() {
        let mut transport = MockHttpTransport::new();

        transport
            .expect_execute()
            .withf(|request, bearer| request.method == Method::Get && bearer.is_none())
            .times(1)
            .returning(|_, _| {
                Ok(ApiResponse {
                    status: 200,
                    body: json!({}),
                })
            });

        let client = client_with(transport);

        let response = client
            .execute(ApiRequest::get("/restaurants"))
            .await
            .expect("request should pass through");

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn unauthorized_without_refresh_token_is_not_retried() {
        let mut transport = MockHttpTransport::new();

        transport.expect_execute().times(1).returning(|_, _| {
            Ok(ApiResponse {
                status: 401,
                body: serde_json::Value::Null,
            })
        });

        let client = client_with(transport);

        let error = client
            .execute(ApiRequest::get("/users/profile").authenticated())
            .await
            .expect_err("401 with no session must propagate");

        assert!(
            matches!(error, ApiError::Unauthorized),
            "expected Unauthorized, got {error:?}"
        );
    }

    #[tokio::test]
    async fn error_status_on_unauthenticated_request_passes_through() {
        let mut transport = MockHttpTransport::new();

        transport.expect_execute().times(1).returning(|_, _| {
            Ok(ApiResponse {
                status: 503,
                body: serde_json::Value::Null,
            })
        });

        let client = client_with(transport);

        let response = client
            .execute(ApiRequest::get("/restaurants"))
            .await
            .expect("non-401 statuses are the caller's to interpret");

        assert_eq!(response.status, 503);
    }
}
