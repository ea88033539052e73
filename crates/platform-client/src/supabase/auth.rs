//! Auth server client: one-time codes, session persistence and refresh.

use super::{error_from_response, RefreshPolicy, SupabaseEndpoint};
use crate::{
    AuthChange, AuthEvent, AuthService, AuthUser, OtpOptions, PlatformError, PlatformResult,
    Session, Verification,
};
use async_trait::async_trait;
use chrono::Utc;
use inkleaf_storage::{LocalStore, StorageKeys};
use parking_lot::Mutex;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the auth notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    create_user: bool,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    email: &'a str,
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Token grant as returned by `/verify` and `/token`. Every field is
/// optional because `/verify` may acknowledge without issuing a session.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

impl TokenResponse {
    fn into_verification(self) -> Verification {
        let user = self.user.clone();
        Verification {
            user,
            session: self.into_session(),
        }
    }

    fn into_session(self) -> Option<Session> {
        let access_token = self.access_token?;
        let refresh_token = self.refresh_token?;
        let user = self.user?;
        let expires_in = self.expires_in.unwrap_or_default();
        let expires_at = self
            .expires_at
            .or_else(|| (expires_in > 0).then(|| Utc::now().timestamp() + expires_in));
        Some(Session {
            access_token,
            refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in,
            expires_at,
            user,
        })
    }
}

/// [`AuthService`] backed by the hosted auth server's REST API.
///
/// The session is cached in memory and persisted as JSON in the given
/// store under `sb-<project_ref>-auth-token`.
pub struct SupabaseAuthClient {
    endpoint: SupabaseEndpoint,
    storage: Arc<dyn LocalStore>,
    storage_key: String,
    refresh_policy: RefreshPolicy,
    cached: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
}

impl SupabaseAuthClient {
    pub fn new(endpoint: SupabaseEndpoint, storage: Arc<dyn LocalStore>) -> PlatformResult<Self> {
        let storage_key = StorageKeys::auth_token(&endpoint.project_ref()?);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            endpoint,
            storage,
            storage_key,
            refresh_policy: RefreshPolicy::default(),
            cached: Mutex::new(None),
            events,
        })
    }

    pub fn with_refresh_policy(mut self, refresh_policy: RefreshPolicy) -> Self {
        self.refresh_policy = refresh_policy;
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn load_session(&self) -> PlatformResult<Option<Session>> {
        if let Some(session) = self.cached.lock().clone() {
            return Ok(Some(session));
        }

        let Some(raw) = self.storage.get(&self.storage_key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                *self.cached.lock() = Some(session.clone());
                Ok(Some(session))
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable stored session");
                self.storage.delete(&self.storage_key)?;
                Ok(None)
            }
        }
    }

    fn store_session(&self, session: &Session) -> PlatformResult<()> {
        let raw = serde_json::to_string(session)?;
        self.storage.set(&self.storage_key, &raw)?;
        *self.cached.lock() = Some(session.clone());
        Ok(())
    }

    fn forget_session(&self) -> PlatformResult<()> {
        self.cached.lock().take();
        self.storage.delete(&self.storage_key)?;
        Ok(())
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        // No subscribers is fine.
        let _ = self.events.send(AuthChange::new(event, session));
    }

    async fn refresh_with_backoff(&self, refresh_token: &str) -> PlatformResult<Session> {
        if self.refresh_policy.attempts == 0 {
            return Err(PlatformError::RefreshExhausted(0));
        }
        let mut delays = self.refresh_policy.backoff();
        let mut attempt = 1u32;
        loop {
            let error = match self.try_refresh(refresh_token).await {
                Ok(session) => return Ok(session),
                Err(e) if e.is_transient() => e,
                Err(e) => {
                    warn!(error = %e, "token refresh rejected");
                    return Err(e);
                }
            };
            let Some(delay) = delays.next() else {
                warn!(attempts = attempt, error = %error, "token refresh gave up");
                return Err(error);
            };
            debug!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "token refresh failed, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn try_refresh(&self, refresh_token: &str) -> PlatformResult<Session> {
        let mut url = self.endpoint.url("/auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        debug!("Refreshing access token");

        let response = self
            .endpoint
            .request(Method::POST, url, None)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "refresh").await);
        }

        let grant: TokenResponse = response.json().await?;
        grant.into_session().ok_or_else(|| PlatformError::Api {
            status: 200,
            code: None,
            message: "refresh response carried no session".to_string(),
        })
    }

    async fn fetch_user(&self, access_token: &str) -> PlatformResult<Option<AuthUser>> {
        let url = self.endpoint.url("/auth/v1/user")?;

        let response = self
            .endpoint
            .request(Method::GET, url, Some(access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = error_from_response(response, "user").await;
            if err.is_unauthorized() {
                debug!("Server rejected session");
                return Ok(None);
            }
            return Err(err);
        }

        let user: AuthUser = response.json().await?;
        debug!(user_id = %user.id, "Session verified with server");
        Ok(Some(user))
    }
}

#[async_trait]
impl AuthService for SupabaseAuthClient {
    async fn send_one_time_code(&self, email: &str, options: &OtpOptions) -> PlatformResult<()> {
        let mut url = self.endpoint.url("/auth/v1/otp")?;
        if let Some(redirect) = &options.email_redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }

        let response = self
            .endpoint
            .request(Method::POST, url, None)
            .json(&OtpRequest {
                email,
                create_user: options.should_create_user,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "otp").await);
        }

        info!("One-time code sent");
        Ok(())
    }

    async fn verify_one_time_code(&self, email: &str, code: &str) -> PlatformResult<Verification> {
        let url = self.endpoint.url("/auth/v1/verify")?;

        let response = self
            .endpoint
            .request(Method::POST, url, None)
            .json(&VerifyRequest {
                kind: "email",
                email,
                token: code,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "verify").await);
        }

        let verification = response.json::<TokenResponse>().await?.into_verification();
        if let Some(session) = &verification.session {
            self.store_session(session)?;
            info!(user_id = %session.user.id, "Signed in with one-time code");
            self.emit(AuthEvent::SignedIn, Some(session.clone()));
        }
        Ok(verification)
    }

    async fn current_session(&self) -> PlatformResult<Option<Session>> {
        let Some(session) = self.load_session()? else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }

        debug!(user_id = %session.user.id, "Stored session expired, refreshing");
        match self.refresh_with_backoff(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store_session(&refreshed)?;
                info!(user_id = %refreshed.user.id, "Token refreshed successfully");
                self.emit(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                warn!(error = %e, "Refresh token rejected, dropping session");
                self.forget_session()?;
                self.emit(AuthEvent::SignedOut, None);
                Ok(None)
            }
        }
    }

    async fn current_user(&self) -> PlatformResult<Option<AuthUser>> {
        match self.current_session().await? {
            Some(session) => self.fetch_user(&session.access_token).await,
            None => Ok(None),
        }
    }

    async fn sign_out(&self) -> PlatformResult<()> {
        let session = self.load_session().unwrap_or_else(|e| {
            warn!(error = %e, "could not read stored session before sign-out");
            None
        });

        // Local state goes first: the remote call may never return.
        self.forget_session()?;
        self.emit(AuthEvent::SignedOut, None);

        let Some(session) = session else {
            return Ok(());
        };
        let mut url = self.endpoint.url("/auth/v1/logout")?;
        url.query_pairs_mut().append_pair("scope", "global");
        let response = self
            .endpoint
            .request(Method::POST, url, Some(&session.access_token))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        let err = error_from_response(response, "logout").await;
        // A session the server no longer knows is already signed out.
        if err.is_unauthorized() || matches!(err, PlatformError::Api { status: 404, .. }) {
            Ok(())
        } else {
            Err(err)
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}
