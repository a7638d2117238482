//! # Auth Store
//!
//! Session state for the signed-in user: a `(user, token)` pair cached in
//! persistent storage and hydrated once at startup.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  startup ──► check_auth() ── cached token? ── /user valid? ──┐  │
//! │                 │ (latched by is_initialized)                │  │
//! │                 ▼                                            ▼  │
//! │  login/register ──► token into transport + session cache  ready │
//! │  logout ──────────► best-effort POST /logout, always clears     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use toko_api::{ApiError, ApiResult, Envelope, Transport, TransportExt};
use toko_core::{
    AuthResponse, ChangePasswordRequest, LoginCredentials, RegisterData, UpdateUserRequest, User,
};

use crate::session::{Session, SessionCache};

#[derive(Default)]
struct AuthState {
    user: Option<User>,
    token: Option<String>,
    is_loading: bool,
    is_initialized: bool,
    error: Option<String>,
}

/// The `/user` payload nests the user one level down.
#[derive(Deserialize)]
struct UserPayload {
    user: User,
}

pub struct AuthStore {
    transport: Arc<dyn Transport>,
    session: SessionCache,
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new(transport: Arc<dyn Transport>, session: SessionCache) -> Arc<Self> {
        Arc::new(AuthStore {
            transport,
            session,
            state: RwLock::new(AuthState::default()),
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.read().await;
        state.user.is_some() && state.token.is_some()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_initialized
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn set_auth(&self, auth: AuthResponse) {
        self.transport.set_token(Some(auth.token.clone())).await;

        if let Err(e) = self.session.store(&Session {
            token: auth.token.clone(),
            user: Some(auth.user.clone()),
        }) {
            warn!("Failed to persist session: {}", e);
        }

        let mut state = self.state.write().await;
        state.user = Some(auth.user);
        state.token = Some(auth.token);
    }

    /// Clears local auth state everywhere: store, transport, cache.
    pub async fn clear_auth(&self) {
        self.transport.set_token(None).await;
        self.session.clear();

        let mut state = self.state.write().await;
        state.user = None;
        state.token = None;
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn finish(&self, error: Option<&ApiError>) {
        let mut state = self.state.write().await;
        state.is_loading = false;
        state.error = error.map(|e| e.to_string());
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<User> {
        self.begin().await;
        let result: ApiResult<Envelope<AuthResponse>> = self
            .transport
            .post_json("/login", Some(toko_api::transport::to_body(credentials)?))
            .await;
        self.finish(result.as_ref().err()).await;

        let auth = result?.data;
        let user = auth.user.clone();
        info!(user_id = user.id, "Logged in");
        self.set_auth(auth).await;
        Ok(user)
    }

    pub async fn register(&self, data: &RegisterData) -> ApiResult<User> {
        self.begin().await;
        let result: ApiResult<Envelope<AuthResponse>> = self
            .transport
            .post_json("/register", Some(toko_api::transport::to_body(data)?))
            .await;
        self.finish(result.as_ref().err()).await;

        let auth = result?.data;
        let user = auth.user.clone();
        info!(user_id = user.id, "Registered");
        self.set_auth(auth).await;
        Ok(user)
    }

    /// Logs out. The server call is best-effort: local state is cleared
    /// even when the request fails.
    pub async fn logout(&self) {
        if self.is_authenticated().await {
            if let Err(e) = self.transport.post("/logout", None).await {
                warn!("Logout API call failed: {}", e);
            }
        }
        self.clear_auth().await;
        info!("Logged out");
    }

    /// Re-fetches the current user. A failure means the token is invalid,
    /// so auth state is cleared before the error propagates.
    pub async fn refresh_user(&self) -> ApiResult<()> {
        if self.state.read().await.token.is_none() {
            return Ok(());
        }

        self.begin().await;
        let result: ApiResult<Envelope<UserPayload>> =
            self.transport.get_json("/user", &[]).await;
        self.finish(result.as_ref().err()).await;

        match result {
            Ok(envelope) => {
                self.state.write().await.user = Some(envelope.data.user);
                Ok(())
            }
            Err(e) => {
                self.clear_auth().await;
                Err(e)
            }
        }
    }

    /// Hydrates the session from the cache, once. Subsequent calls are
    /// no-ops (idempotent via the `is_initialized` latch).
    pub async fn check_auth(&self) {
        if self.state.read().await.is_initialized {
            return;
        }

        if let Some(session) = self.session.load() {
            debug!("Hydrating session from cache");
            self.transport.set_token(Some(session.token.clone())).await;
            {
                let mut state = self.state.write().await;
                state.token = Some(session.token);
                state.user = session.user;
            }

            // Token may have expired since it was cached; refresh_user
            // clears auth when the server rejects it.
            if self.refresh_user().await.is_err() {
                debug!("Cached token rejected, session cleared");
            }
        }

        self.state.write().await.is_initialized = true;
    }

    /// Exchanges the current token for a fresh one.
    pub async fn refresh_token(&self) -> ApiResult<()> {
        if self.state.read().await.token.is_none() {
            return Ok(());
        }

        self.begin().await;
        let result: ApiResult<Envelope<AuthResponse>> =
            self.transport.post_json("/refresh", None).await;
        self.finish(result.as_ref().err()).await;

        match result {
            Ok(envelope) => {
                self.set_auth(envelope.data).await;
                Ok(())
            }
            Err(e) => {
                self.clear_auth().await;
                Err(e)
            }
        }
    }

    pub async fn update_profile(&self, data: &UpdateUserRequest) -> ApiResult<User> {
        let user_id = match self.state.read().await.user.as_ref() {
            Some(user) => user.id,
            None => return Err(ApiError::auth_required()),
        };

        self.begin().await;
        let result: ApiResult<Envelope<User>> = self
            .transport
            .put_json(
                &format!("/users/{}", user_id),
                Some(toko_api::transport::to_body(data)?),
            )
            .await;
        self.finish(result.as_ref().err()).await;

        let user = result?.data;
        self.state.write().await.user = Some(user.clone());
        Ok(user)
    }

    pub async fn change_password(&self, data: &ChangePasswordRequest) -> ApiResult<()> {
        if !self.is_authenticated().await {
            return Err(ApiError::auth_required());
        }

        self.begin().await;
        let result = self
            .transport
            .post("/change-password", Some(toko_api::transport::to_body(data)?))
            .await;
        self.finish(result.as_ref().err()).await;

        result.map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
