//! Public handle to the session worker.

use crate::profile::ProfileRepository;
use crate::worker::{Command, SessionWorker};
use crate::{SessionError, SessionResult, SessionSnapshot};
use inkleaf_storage::StorageScopes;
use parking_lot::Mutex;
use platform_client::{AuthService, DataStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default upper bound on each auth and profile call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(8);

const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Deadline applied to every collaborator call.
    pub call_timeout: Duration,
    /// Link embedded in the one-time code email.
    pub otp_redirect_url: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            otp_redirect_url: None,
        }
    }
}

impl SessionConfig {
    pub fn from_config(config: &inkleaf_config::Config) -> Self {
        Self {
            call_timeout: config.auth_timeout(),
            otp_redirect_url: config.session.otp_redirect_url.clone(),
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Owns the storefront session: restores it on start, runs the one-time
/// code login, and tracks remote auth changes.
///
/// Cloning yields another handle to the same worker. All operations and
/// notifications are processed in arrival order by a single task; state is
/// observed through [`SessionController::snapshot`] or
/// [`SessionController::subscribe`].
#[derive(Clone)]
pub struct SessionController {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionSnapshot>,
    alive: Arc<AtomicBool>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl SessionController {
    /// Start the controller. Restore of the stored session is queued
    /// before anything else; the snapshot stays `Initializing` and loading
    /// until it completes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        auth: Arc<dyn AuthService>,
        data: Arc<dyn DataStore>,
        storage: StorageScopes,
        config: SessionConfig,
    ) -> Self {
        // Subscribe before restoring so no notification is missed.
        let mut events = auth.subscribe();
        let (commands, receiver) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (publisher, state) = watch::channel(SessionSnapshot::default());
        let alive = Arc::new(AtomicBool::new(true));

        // The queue is empty, so this cannot fail.
        let _ = commands.try_send(Command::Restore);

        let profiles = ProfileRepository::new(data, config.call_timeout);
        let worker = SessionWorker::new(
            auth,
            profiles,
            storage,
            config,
            publisher,
            alive.clone(),
        );
        let worker_task = tokio::spawn(worker.run(receiver));

        let forward = commands.clone();
        let forwarder_task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(change) => {
                        if forward.send(Command::AuthChanged(change)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "auth notifications dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("auth notification forwarder stopped");
        });

        info!("session controller started");
        Self {
            commands,
            state,
            alive,
            tasks: Arc::new(Mutex::new(vec![worker_task, forwarder_task])),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Wait until restore has finished and nothing is in flight.
    pub async fn wait_until_settled(&self) -> SessionResult<SessionSnapshot> {
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(SessionSnapshot::is_settled)
            .await
            .map_err(|_| SessionError::ControllerStopped)?;
        Ok(snapshot.clone())
    }

    /// Send a one-time code to `email`. Any existing session is ended
    /// first; on success the phase becomes `AwaitingCode`.
    pub async fn request_code(&self, email: &str) -> SessionResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RequestCode {
            email: email.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| SessionError::ControllerStopped)?
    }

    /// Verify `code` for `email`. On failure the phase and pending email
    /// are kept so the user can retry.
    pub async fn verify_code(&self, email: &str, code: &str) -> SessionResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::VerifyCode {
            email: email.to_string(),
            code: code.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| SessionError::ControllerStopped)?
    }

    /// Sign out remotely and locally. Local state and storage are always
    /// cleared, even when the remote call fails.
    pub async fn sign_out(&self) -> SessionResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SignOut { reply }).await?;
        rx.await.map_err(|_| SessionError::ControllerStopped)
    }

    /// Resolve once everything queued before this call has been handled.
    pub async fn flush(&self) -> SessionResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Flush { reply }).await?;
        rx.await.map_err(|_| SessionError::ControllerStopped)
    }

    /// Stop processing. In-flight calls finish unobserved and no further
    /// state is published.
    pub fn shutdown(&self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.try_send(Command::Shutdown);
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        info!("session controller stopped");
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn send(&self, command: Command) -> SessionResult<()> {
        if !self.is_running() {
            return Err(SessionError::ControllerStopped);
        }
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::ControllerStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_eight_seconds() {
        let config = SessionConfig::default();
        assert_eq!(config.call_timeout, Duration::from_secs(8));
        assert!(config.otp_redirect_url.is_none());
    }

    #[test]
    fn config_from_app_config() {
        let mut app = inkleaf_config::Config::default();
        app.session.call_timeout_ms = 2500;
        app.session.otp_redirect_url = Some("https://inkleaf.studio/auth/callback".into());

        let config = SessionConfig::from_config(&app);
        assert_eq!(config.call_timeout, Duration::from_millis(2500));
        assert_eq!(
            config.otp_redirect_url.as_deref(),
            Some("https://inkleaf.studio/auth/callback")
        );
    }
}
