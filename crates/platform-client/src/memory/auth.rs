//! In-memory auth service.

use super::Behavior;
use crate::{
    AuthChange, AuthEvent, AuthService, AuthUser, OtpOptions, PlatformError, PlatformResult,
    Session, Verification,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Code every address receives unless configured otherwise.
pub const DEFAULT_ACCEPTED_CODE: &str = "123456";

const SESSION_TTL_SECS: i64 = 3600;

/// Operations whose behavior can be scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOperation {
    SendCode,
    Verify,
    CurrentSession,
    CurrentUser,
    SignOut,
}

#[derive(Default)]
struct State {
    users: HashMap<String, AuthUser>,
    /// Outstanding code per email; consumed by a successful verification.
    issued: HashMap<String, String>,
    session: Option<Session>,
    /// Session the server still honours; `None` after a remote revoke.
    server_accepts: bool,
    behaviors: HashMap<AuthOperation, Behavior>,
    calls: HashMap<AuthOperation, usize>,
    acknowledge_without_session: bool,
}

/// [`AuthService`] that keeps users, codes and the session in memory.
///
/// Every sent code is [`DEFAULT_ACCEPTED_CODE`] (see
/// [`MemoryAuthService::with_accepted_code`]); a code is single-use.
pub struct MemoryAuthService {
    accepted_code: String,
    state: Mutex<State>,
    events: broadcast::Sender<AuthChange>,
}

impl Default for MemoryAuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthService {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(100);
        Self {
            accepted_code: DEFAULT_ACCEPTED_CODE.to_string(),
            state: Mutex::new(State::default()),
            events,
        }
    }

    pub fn with_accepted_code(mut self, code: impl Into<String>) -> Self {
        self.accepted_code = code.into();
        self
    }

    /// Start with a stored session for `email`, as if the user signed in
    /// during an earlier run.
    pub fn with_stored_session(self, email: &str) -> Self {
        {
            let mut state = self.state.lock();
            let user = user_for(&mut state, email);
            state.session = Some(new_session(user));
            state.server_accepts = true;
        }
        self
    }

    /// Script how the next calls of `operation` behave.
    pub fn set_behavior(&self, operation: AuthOperation, behavior: Behavior) {
        self.state.lock().behaviors.insert(operation, behavior);
    }

    /// Make verification succeed without returning user or session, while
    /// still establishing the session.
    pub fn acknowledge_without_session(&self, enabled: bool) {
        self.state.lock().acknowledge_without_session = enabled;
    }

    /// How many times `operation` was called.
    pub fn calls(&self, operation: AuthOperation) -> usize {
        self.state.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// The locally stored session, without scripting or counting.
    pub fn stored_session(&self) -> Option<Session> {
        self.state.lock().session.clone()
    }

    /// Keep the local session but make the server reject it.
    pub fn revoke_server_side(&self) {
        self.state.lock().server_accepts = false;
    }

    /// Sign the user out from elsewhere: drop the session and notify.
    pub fn sign_out_elsewhere(&self) {
        self.state.lock().session = None;
        self.emit(AuthChange::new(AuthEvent::SignedOut, None));
    }

    /// Rotate the access token and notify, as a background refresh would.
    pub fn refresh_elsewhere(&self) -> Option<Session> {
        let refreshed = {
            let mut state = self.state.lock();
            let user = state.session.as_ref()?.user.clone();
            let session = new_session(user);
            state.session = Some(session.clone());
            session
        };
        self.emit(AuthChange::new(
            AuthEvent::TokenRefreshed,
            Some(refreshed.clone()),
        ));
        Some(refreshed)
    }

    /// Push an arbitrary notification.
    pub fn emit(&self, change: AuthChange) {
        let _ = self.events.send(change);
    }

    fn gate(&self, operation: AuthOperation) -> Behavior {
        let mut state = self.state.lock();
        *state.calls.entry(operation).or_default() += 1;
        state.behaviors.get(&operation).cloned().unwrap_or_default()
    }
}

fn user_for(state: &mut State, email: &str) -> AuthUser {
    state
        .users
        .entry(email.to_string())
        .or_insert_with(|| AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        })
        .clone()
}

fn new_session(user: AuthUser) -> Session {
    Session {
        access_token: format!("mem-access-{}", Uuid::new_v4()),
        refresh_token: format!("mem-refresh-{}", Uuid::new_v4()),
        token_type: "bearer".to_string(),
        expires_in: SESSION_TTL_SECS,
        expires_at: Some(Utc::now().timestamp() + SESSION_TTL_SECS),
        user,
    }
}

#[async_trait]
impl AuthService for MemoryAuthService {
    async fn send_one_time_code(&self, email: &str, options: &OtpOptions) -> PlatformResult<()> {
        self.gate(AuthOperation::SendCode).apply().await?;

        let mut state = self.state.lock();
        if !options.should_create_user && !state.users.contains_key(email) {
            return Err(PlatformError::Api {
                status: 422,
                code: Some("otp_disabled".to_string()),
                message: "Signups not allowed for otp".to_string(),
            });
        }
        user_for(&mut state, email);
        state
            .issued
            .insert(email.to_string(), self.accepted_code.clone());
        debug!("issued one-time code");
        Ok(())
    }

    async fn verify_one_time_code(&self, email: &str, code: &str) -> PlatformResult<Verification> {
        self.gate(AuthOperation::Verify).apply().await?;

        let (verification, session) = {
            let mut state = self.state.lock();
            if state.issued.get(email).map(String::as_str) != Some(code) {
                return Err(PlatformError::Api {
                    status: 403,
                    code: Some("otp_expired".to_string()),
                    message: "Token has expired or is invalid".to_string(),
                });
            }
            state.issued.remove(email);

            let user = user_for(&mut state, email);
            let session = new_session(user.clone());
            state.session = Some(session.clone());
            state.server_accepts = true;

            let verification = if state.acknowledge_without_session {
                Verification::default()
            } else {
                Verification {
                    user: Some(user),
                    session: Some(session.clone()),
                }
            };
            (verification, session)
        };

        self.emit(AuthChange::new(AuthEvent::SignedIn, Some(session)));
        Ok(verification)
    }

    async fn current_session(&self) -> PlatformResult<Option<Session>> {
        self.gate(AuthOperation::CurrentSession).apply().await?;
        Ok(self.state.lock().session.clone())
    }

    async fn current_user(&self) -> PlatformResult<Option<AuthUser>> {
        self.gate(AuthOperation::CurrentUser).apply().await?;
        let state = self.state.lock();
        Ok(state
            .session
            .as_ref()
            .filter(|_| state.server_accepts)
            .map(|session| session.user.clone()))
    }

    async fn sign_out(&self) -> PlatformResult<()> {
        self.gate(AuthOperation::SignOut).apply().await?;
        self.state.lock().session = None;
        self.emit(AuthChange::new(AuthEvent::SignedOut, None));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn code_is_single_use() {
        let auth = MemoryAuthService::new();
        auth.send_one_time_code("a@example.com", &OtpOptions::default())
            .await
            .unwrap();

        let first = auth
            .verify_one_time_code("a@example.com", DEFAULT_ACCEPTED_CODE)
            .await
            .unwrap();
        assert!(first.session.is_some());

        let second = auth
            .verify_one_time_code("a@example.com", DEFAULT_ACCEPTED_CODE)
            .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn wrong_code_keeps_the_issued_code() {
        let auth = MemoryAuthService::new();
        auth.send_one_time_code("a@example.com", &OtpOptions::default())
            .await
            .unwrap();

        assert!(auth
            .verify_one_time_code("a@example.com", "000000")
            .await
            .is_err());
        assert!(auth
            .verify_one_time_code("a@example.com", DEFAULT_ACCEPTED_CODE)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_user_without_signup_is_rejected() {
        let auth = MemoryAuthService::new();
        let options = OtpOptions {
            should_create_user: false,
            email_redirect_to: None,
        };
        assert!(auth
            .send_one_time_code("new@example.com", &options)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn same_email_keeps_the_same_user_id() {
        let auth = MemoryAuthService::new().with_stored_session("a@example.com");
        let before = auth.stored_session().unwrap().user.id;

        auth.send_one_time_code("a@example.com", &OtpOptions::default())
            .await
            .unwrap();
        let verification = auth
            .verify_one_time_code("a@example.com", DEFAULT_ACCEPTED_CODE)
            .await
            .unwrap();
        assert_eq!(verification.user.unwrap().id, before);
    }

    #[tokio::test]
    async fn revoked_session_has_no_current_user() {
        let auth = MemoryAuthService::new().with_stored_session("a@example.com");
        auth.revoke_server_side();

        assert!(auth.current_session().await.unwrap().is_some());
        assert!(auth.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scripted_failure_and_call_counts() {
        let auth = MemoryAuthService::new();
        auth.set_behavior(AuthOperation::SignOut, Behavior::Unavailable);

        let err = auth.sign_out().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(auth.calls(AuthOperation::SignOut), 1);
    }

    #[tokio::test]
    async fn verification_notifies_subscribers() {
        let auth = MemoryAuthService::new();
        let mut events = auth.subscribe();
        auth.send_one_time_code("a@example.com", &OtpOptions::default())
            .await
            .unwrap();
        auth.verify_one_time_code("a@example.com", DEFAULT_ACCEPTED_CODE)
            .await
            .unwrap();

        let change = events.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedIn);
        assert!(change.session.is_some());
    }
}
