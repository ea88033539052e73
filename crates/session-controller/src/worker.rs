//! The task that owns all mutable session state.
//!
//! Direct calls and auth notifications arrive on one queue and are
//! handled strictly one at a time, so every transition is linearized.

use crate::deadline::with_deadline;
use crate::profile::ProfileRepository;
use crate::session_fsm::{SessionMachine, SessionMachineInput};
use crate::validate::{normalize_code, normalize_email};
use crate::{CurrentUser, SessionConfig, SessionError, SessionPhase, SessionResult, SessionSnapshot};
use inkleaf_storage::StorageScopes;
use platform_client::{AuthChange, AuthEvent, AuthService, AuthUser, OtpOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Work items processed by the worker.
pub(crate) enum Command {
    Restore,
    RequestCode {
        email: String,
        reply: oneshot::Sender<SessionResult<()>>,
    },
    VerifyCode {
        email: String,
        code: String,
        reply: oneshot::Sender<SessionResult<()>>,
    },
    SignOut {
        reply: oneshot::Sender<()>,
    },
    AuthChanged(AuthChange),
    Flush {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

pub(crate) struct SessionWorker {
    auth: Arc<dyn AuthService>,
    profiles: ProfileRepository,
    storage: StorageScopes,
    config: SessionConfig,
    machine: SessionMachine,
    state: SessionSnapshot,
    publisher: watch::Sender<SessionSnapshot>,
    alive: Arc<AtomicBool>,
}

impl SessionWorker {
    pub(crate) fn new(
        auth: Arc<dyn AuthService>,
        profiles: ProfileRepository,
        storage: StorageScopes,
        config: SessionConfig,
        publisher: watch::Sender<SessionSnapshot>,
        alive: Arc<AtomicBool>,
    ) -> Self {
        Self {
            auth,
            profiles,
            storage,
            config,
            machine: SessionMachine::new(),
            state: SessionSnapshot::default(),
            publisher,
            alive,
        }
    }

    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            if !self.is_alive() {
                break;
            }
            match command {
                Command::Restore => self.restore().await,
                Command::RequestCode { email, reply } => {
                    let result = self.request_code(&email).await;
                    let _ = reply.send(self.gate(result));
                }
                Command::VerifyCode { email, code, reply } => {
                    let result = self.verify_code(&email, &code).await;
                    let _ = reply.send(self.gate(result));
                }
                Command::SignOut { reply } => {
                    self.sign_out().await;
                    let _ = reply.send(());
                }
                Command::AuthChanged(change) => self.auth_changed(change).await,
                Command::Flush { reply } => {
                    let _ = reply.send(());
                }
                Command::Shutdown => break,
            }
        }
        debug!("session worker stopped");
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Results of calls that finished after shutdown are not reported.
    fn gate(&self, result: SessionResult<()>) -> SessionResult<()> {
        if self.is_alive() {
            result
        } else {
            Err(SessionError::ControllerStopped)
        }
    }

    fn phase(&self) -> SessionPhase {
        SessionPhase::from(self.machine.state())
    }

    fn transition(&mut self, input: SessionMachineInput) -> SessionResult<SessionPhase> {
        let from = self.phase();
        self.machine.consume(&input).map_err(|_| {
            SessionError::InvalidStateTransition(format!("{input:?} from {from:?}"))
        })?;
        let to = self.phase();
        if from != to {
            info!(from = from.as_str(), to = to.as_str(), "session phase changed");
        }
        Ok(to)
    }

    fn apply(&mut self, input: SessionMachineInput) {
        if let Err(e) = self.transition(input) {
            warn!(error = %e, "ignored session transition");
        }
    }

    /// Publish the current state unless the controller has been shut down.
    fn publish(&mut self) {
        if !self.is_alive() {
            debug!("controller stopped, dropping state update");
            return;
        }
        self.state.phase = self.phase();
        self.publisher.send_replace(self.state.clone());
    }

    async fn call<F, T>(&self, operation: &str, future: F) -> SessionResult<T>
    where
        F: std::future::Future<Output = platform_client::PlatformResult<T>>,
    {
        Ok(with_deadline(operation, self.config.call_timeout, future).await??)
    }

    /// Best-effort remote sign-out; failures are only logged.
    async fn remote_sign_out(&self) {
        if let Err(e) = self.call("signOut", self.auth.sign_out()).await {
            warn!(error = %e, "remote sign-out failed");
        }
    }

    // ---------------------------------------------------------------------
    // Restore
    // ---------------------------------------------------------------------

    async fn restore(&mut self) {
        match self.try_restore().await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, is_admin = user.is_admin, "session restored");
                self.state.current_user = Some(user);
                self.apply(SessionMachineInput::SessionRestored);
            }
            Ok(None) => {
                debug!("no stored session, clearing leftovers");
                self.remote_sign_out().await;
                if let Err(e) = self.storage.purge_auth_keys() {
                    warn!(error = %e, "failed to purge stale auth keys");
                }
                self.apply(SessionMachineInput::RestoreFailed);
            }
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "session restore failed, signing out");
                self.remote_sign_out().await;
                if let Err(e) = self.storage.purge_auth_keys() {
                    warn!(error = %e, "failed to purge stale auth keys");
                }
                self.state.current_user = None;
                self.apply(SessionMachineInput::RestoreFailed);
            }
        }
        self.state.loading = false;
        self.publish();
    }

    async fn try_restore(&mut self) -> SessionResult<Option<CurrentUser>> {
        let Some(session) = self.call("getSession", self.auth.current_session()).await? else {
            return Ok(None);
        };
        let Some(user) = self.call("getUser", self.auth.current_user()).await? else {
            return Err(SessionError::AuthService(
                "stored session was rejected".to_string(),
            ));
        };
        if user.id != session.user.id {
            return Err(SessionError::AuthService(
                "stored session belongs to another user".to_string(),
            ));
        }
        Ok(Some(self.profiles.resolve(&user).await))
    }

    // ---------------------------------------------------------------------
    // Request code
    // ---------------------------------------------------------------------

    async fn request_code(&mut self, raw_email: &str) -> SessionResult<()> {
        let email = match normalize_email(raw_email) {
            Ok(email) => email,
            Err(e) => return self.fail_fast(e),
        };

        self.state.loading = true;
        self.state.last_error = None;
        self.publish();

        // Drop any cached session so the code is issued for a clean slate.
        self.remote_sign_out().await;
        if self.phase() == SessionPhase::Authenticated {
            self.apply(SessionMachineInput::SignOutRequested);
        }
        self.state.current_user = None;
        self.state.pending_email = None;

        let options = OtpOptions {
            should_create_user: true,
            email_redirect_to: self.config.otp_redirect_url.clone(),
        };
        let result = self
            .call("signInWithOtp", self.auth.send_one_time_code(&email, &options))
            .await;

        match &result {
            Ok(()) => {
                info!(email = %email, "one-time code requested");
                self.state.pending_email = Some(email);
                self.apply(SessionMachineInput::CodeRequested);
            }
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "code request failed");
                self.state.last_error = Some(e.to_string());
                self.apply(SessionMachineInput::RequestFailed);
            }
        }
        self.state.loading = false;
        self.publish();
        result
    }

    /// Record a validation failure without touching the phase.
    fn fail_fast(&mut self, err: SessionError) -> SessionResult<()> {
        debug!(error = %err, "rejected before calling out");
        self.state.last_error = Some(err.to_string());
        self.publish();
        Err(err)
    }

    // ---------------------------------------------------------------------
    // Verify code
    // ---------------------------------------------------------------------

    async fn verify_code(&mut self, raw_email: &str, raw_code: &str) -> SessionResult<()> {
        let (email, code) = match (normalize_email(raw_email), normalize_code(raw_code)) {
            (Ok(email), Ok(code)) => (email, code),
            (Err(e), _) | (_, Err(e)) => return self.fail_fast(e),
        };

        self.state.loading = true;
        self.state.last_error = None;
        self.publish();

        let result = self.try_verify(&email, &code).await;
        match &result {
            Ok(user) => {
                info!(user_id = %user.id, is_admin = user.is_admin, "signed in");
                self.state.current_user = Some(user.clone());
                self.state.pending_email = None;
                self.apply(SessionMachineInput::CodeVerified);
            }
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "code verification failed");
                self.state.last_error = Some(e.to_string());
            }
        }
        self.state.loading = false;
        self.publish();
        result.map(|_| ())
    }

    async fn try_verify(&mut self, email: &str, code: &str) -> SessionResult<CurrentUser> {
        let verification = self
            .call("verifyOtp", self.auth.verify_one_time_code(email, code))
            .await?;

        let user: AuthUser = match (verification.user, verification.session) {
            (Some(user), Some(_)) => user,
            _ => {
                debug!("verification acknowledged without a session, re-reading");
                self.call("getSession", self.auth.current_session())
                    .await?
                    .map(|session| session.user)
                    .ok_or_else(|| {
                        SessionError::AuthService(
                            "verification did not establish a session".to_string(),
                        )
                    })?
            }
        };
        Ok(self.profiles.resolve(&user).await)
    }

    // ---------------------------------------------------------------------
    // Sign out
    // ---------------------------------------------------------------------

    async fn sign_out(&mut self) {
        self.state.loading = true;
        self.publish();

        self.remote_sign_out().await;
        if let Err(e) = self.storage.clear_all() {
            warn!(error = %e, "failed to clear local storage");
        }

        self.state.current_user = None;
        self.state.pending_email = None;
        self.state.last_error = None;
        self.apply(SessionMachineInput::SignOutRequested);
        self.state.loading = false;
        self.publish();
        info!("signed out");
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    async fn auth_changed(&mut self, change: AuthChange) {
        debug!(event = ?change.event, phase = self.phase().as_str(), "auth notification");
        match change.event {
            AuthEvent::SignedOut => {
                if self.phase() != SessionPhase::Authenticated {
                    return;
                }
                // Our own earlier sign-outs notify too; a live session outlasts them.
                if let Ok(Some(_)) = self.call("getSession", self.auth.current_session()).await {
                    debug!("ignoring stale sign-out notification");
                    return;
                }
                self.state.current_user = None;
                self.apply(SessionMachineInput::RemoteSignedOut);
                self.publish();
            }
            AuthEvent::SignedIn | AuthEvent::TokenRefreshed => {
                // Re-read: the notification may predate a later sign-out.
                let session = match self.call("getSession", self.auth.current_session()).await {
                    Ok(Some(session)) => session,
                    Ok(None) => {
                        debug!("ignoring stale sign-in notification");
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "could not confirm notified session");
                        return;
                    }
                };
                if let Some(notified) = &change.session {
                    if notified.user.id != session.user.id {
                        debug!("ignoring notification for a replaced session");
                        return;
                    }
                }

                let user = self.profiles.resolve(&session.user).await;
                self.state.current_user = Some(user);
                self.state.pending_email = None;
                self.apply(SessionMachineInput::RemoteSignedIn);
                self.publish();
            }
        }
    }
}
