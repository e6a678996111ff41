//! Session manager.
//!
//! Owns the process-wide access/refresh token pair and the current user.
//! The only transitions are `Unauthenticated -> Authenticated` on a
//! successful login (or restored session) and `Authenticated ->
//! Unauthenticated` on logout or an irrecoverable refresh failure.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    auth::{AuthError, TokenPair, UserProfile},
    http::{ApiError, ApiRequest, HttpTransport},
    storage::{KeyValueStore, keys},
};

#[derive(Debug, Default)]
struct SessionInner {
    tokens: Option<TokenPair>,
    user: Option<UserProfile>,
}

/// Process-wide owner of tokens and the authenticated user.
///
/// Talks to the transport directly: the auth endpoints must not pass
/// through the refresh-and-retry decorator that this manager backs.
pub struct SessionManager {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn KeyValueStore>,
    inner: RwLock<SessionInner>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create an unauthenticated manager.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            transport,
            store,
            inner: RwLock::new(SessionInner::default()),
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Tokens and profile are committed together once both calls have
    /// succeeded, so a failed login leaves any prior session untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the server rejects
    /// the credentials, or [`AuthError::Api`] on transport/server
    /// failures.
    #[tracing::instrument(name = "auth.login", skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let request = ApiRequest::post(
            "/auth/login",
            json!({ "email": email, "password": password }),
        );

        let response = self.transport.execute(request, None).await?;

        if response.is_unauthorized() || response.status == 400 {
            return Err(AuthError::InvalidCredentials);
        }

        if !response.is_success() {
            return Err(AuthError::Api(response.into_server_error()));
        }

        let pair: TokenPairResponse = response.json()?;
        let tokens = TokenPair::new(pair.access_token, pair.refresh_token);

        let user = self.fetch_profile(tokens.access.expose()).await?;

        {
            let mut inner = self.inner.write().await;
            inner.tokens = Some(tokens.clone());
            inner.user = Some(user.clone());
        }

        self.persist_tokens(&tokens).await;

        info!(user_id = %user.id, "logged in");

        Ok(user)
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// Any failure tears the session down: a refresh that cannot complete
    /// means the session is no longer usable.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionExpired`] when no refresh token exists
    /// or the server rejects it, or [`AuthError::Api`] when the exchange
    /// could not be carried out.
    #[tracing::instrument(name = "auth.refresh", skip_all)]
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let refresh_token = {
            let inner = self.inner.read().await;

            match &inner.tokens {
                Some(tokens) => tokens.refresh.expose().to_owned(),
                None => return Err(AuthError::SessionExpired),
            }
        };

        let request = ApiRequest::post(
            "/auth/refresh-token",
            json!({ "refreshToken": refresh_token }),
        );

        let response = match self.transport.execute(request, None).await {
            Ok(response) => response,
            Err(error) => {
                self.expire().await;
                return Err(AuthError::Api(error));
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "refresh token rejected");
            self.expire().await;
            return Err(AuthError::SessionExpired);
        }

        let pair: TokenPairResponse = match response.json() {
            Ok(pair) => pair,
            Err(error) => {
                self.expire().await;
                return Err(AuthError::Api(error));
            }
        };

        let tokens = TokenPair::new(pair.access_token, pair.refresh_token);

        self.inner.write().await.tokens = Some(tokens.clone());
        self.persist_tokens(&tokens).await;

        info!("session refreshed");

        Ok(())
    }

    /// Invalidate the refresh token server-side (best effort), then clear
    /// all session state unconditionally.
    #[tracing::instrument(name = "auth.logout", skip_all)]
    pub async fn logout(&self) {
        let refresh_token = {
            let inner = self.inner.read().await;
            inner
                .tokens
                .as_ref()
                .map(|tokens| tokens.refresh.expose().to_owned())
        };

        if let Some(refresh_token) = refresh_token {
            let request =
                ApiRequest::post("/auth/logout", json!({ "refreshToken": refresh_token }));

            match self.transport.execute(request, None).await {
                Ok(response) if !response.is_success() => {
                    warn!(status = response.status, "server-side logout failed");
                }
                Err(error) => warn!(%error, "server-side logout failed"),
                Ok(_) => {}
            }
        }

        self.expire().await;

        info!("logged out");
    }

    /// Restore a persisted session at process start.
    ///
    /// Fetches the profile with the stored access token; on failure it
    /// performs one refresh-then-refetch. If that also fails all session
    /// state is cleared and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading persisted tokens fails.
    #[tracing::instrument(name = "auth.bootstrap", skip_all)]
    pub async fn bootstrap(&self) -> Result<bool, AuthError> {
        let access = self.store.get(keys::ACCESS_TOKEN).await?;
        let refresh = self.store.get(keys::REFRESH_TOKEN).await?;

        let (Some(access), Some(refresh)) = (access, refresh) else {
            return Ok(false);
        };

        let tokens = TokenPair::new(access, refresh);

        self.inner.write().await.tokens = Some(tokens.clone());

        match self.fetch_profile(tokens.access.expose()).await {
            Ok(user) => {
                info!(user_id = %user.id, "restored session");
                self.inner.write().await.user = Some(user);
                return Ok(true);
            }
            Err(error) => {
                warn!(%error, "stored access token rejected, attempting refresh");
            }
        }

        if self.refresh().await.is_err() {
            // refresh() has already torn the session down
            return Ok(false);
        }

        let bearer = match self.bearer().await {
            Some(bearer) => bearer,
            None => return Ok(false),
        };

        match self.fetch_profile(&bearer).await {
            Ok(user) => {
                info!(user_id = %user.id, "restored session after refresh");
                self.inner.write().await.user = Some(user);
                Ok(true)
            }
            Err(error) => {
                warn!(%error, "profile fetch failed after refresh, clearing session");
                self.expire().await;
                Ok(false)
            }
        }
    }

    /// Current access token, if any.
    pub async fn bearer(&self) -> Option<String> {
        let inner = self.inner.read().await;

        inner
            .tokens
            .as_ref()
            .map(|tokens| tokens.access.expose().to_owned())
    }

    /// Whether a refresh token is available for the retry protocol.
    pub async fn has_refresh_token(&self) -> bool {
        self.inner.read().await.tokens.is_some()
    }

    /// The authenticated user, if any.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.read().await.user.clone()
    }

    /// Whether the session holds both tokens and a user.
    pub async fn is_authenticated(&self) -> bool {
        let inner = self.inner.read().await;

        inner.tokens.is_some() && inner.user.is_some()
    }

    /// Drop all in-memory and persisted session state without calling the
    /// server. Used for logout and irrecoverable refresh failures.
    pub(crate) async fn expire(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.tokens = None;
            inner.user = None;
        }

        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN] {
            if let Err(error) = self.store.remove(key).await {
                warn!(key, %error, "failed to remove persisted token");
            }
        }
    }

    async fn fetch_profile(&self, bearer: &str) -> Result<UserProfile, ApiError> {
        let request = ApiRequest::get("/users/profile").authenticated();

        let response = self
            .transport
            .execute(request, Some(bearer.to_owned()))
            .await?;

        if response.is_unauthorized() {
            return Err(ApiError::Unauthorized);
        }

        if !response.is_success() {
            return Err(response.into_server_error());
        }

        response.json()
    }

    async fn persist_tokens(&self, tokens: &TokenPair) {
        // In-memory state is ground truth; a failed write only costs the
        // session its persistence across restarts.
        let writes = [
            (keys::ACCESS_TOKEN, tokens.access.expose()),
            (keys::REFRESH_TOKEN, tokens.refresh.expose()),
        ];

        for (key, value) in writes {
            if let Err(error) = self.store.put(key, value).await {
                warn!(key, %error, "failed to persist token");
            }
        }
    }
}

/// Token pair as served by the login and refresh endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPairResponse {
    access_token: String,
    refresh_token: String,
}

