//! Auth service contract.

use crate::{AuthChange, AuthUser, OtpOptions, PlatformResult, Session, Verification};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Managed email one-time-code authentication.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Ask the service to email a one-time code to `email`.
    async fn send_one_time_code(&self, email: &str, options: &OtpOptions) -> PlatformResult<()>;

    /// Exchange an emailed code for a session.
    async fn verify_one_time_code(&self, email: &str, code: &str) -> PlatformResult<Verification>;

    /// The locally known session, refreshed if it has expired.
    async fn current_session(&self) -> PlatformResult<Option<Session>>;

    /// The user the service currently recognises for the stored session.
    /// `None` when there is no session or the service rejects it.
    async fn current_user(&self) -> PlatformResult<Option<AuthUser>>;

    /// End the session remotely and forget it locally.
    async fn sign_out(&self) -> PlatformResult<()>;

    /// Subscribe to auth-state notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}
