//! Controller wired to in-memory collaborators.

use crate::{SessionConfig, SessionController, SessionSnapshot};
use inkleaf_storage::StorageScopes;
use platform_client::memory::{MemoryAuthService, MemoryDataStore};
use std::sync::Arc;
use std::time::Duration;

/// Deadline used by every harness; short enough to keep hang tests fast.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(200);

pub const EMAIL: &str = "a@example.com";

pub struct TestHarness {
    pub auth: Arc<MemoryAuthService>,
    pub data: Arc<MemoryDataStore>,
    pub storage: StorageScopes,
    pub session: SessionController,
}

impl TestHarness {
    /// Fresh visitor with nothing stored.
    pub fn new() -> Self {
        Self::with_auth(MemoryAuthService::new())
    }

    /// Visitor who signed in as `email` during an earlier run.
    pub fn returning(email: &str) -> Self {
        Self::with_auth(MemoryAuthService::new().with_stored_session(email))
    }

    pub fn with_auth(auth: MemoryAuthService) -> Self {
        Self::build(Arc::new(auth), Arc::new(MemoryDataStore::new()))
    }

    pub fn build(auth: Arc<MemoryAuthService>, data: Arc<MemoryDataStore>) -> Self {
        Self::build_with_storage(auth, data, StorageScopes::in_memory())
    }

    /// Start against storage the caller has already populated.
    pub fn build_with_storage(
        auth: Arc<MemoryAuthService>,
        data: Arc<MemoryDataStore>,
        storage: StorageScopes,
    ) -> Self {
        let session = SessionController::start(
            auth.clone(),
            data.clone(),
            storage.clone(),
            SessionConfig::default().with_call_timeout(TEST_TIMEOUT),
        );
        Self {
            auth,
            data,
            storage,
            session,
        }
    }

    /// Wait for restore to finish.
    pub async fn ready(&self) -> SessionSnapshot {
        tokio::time::timeout(Duration::from_secs(5), self.session.wait_until_settled())
            .await
            .expect("controller did not settle")
            .expect("controller stopped")
    }

    /// Let forwarded notifications reach the queue, then drain it.
    pub async fn settle(&self) -> SessionSnapshot {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.session.flush().await.expect("controller stopped");
        self.session.snapshot()
    }

    /// Request a code for `email` and assert it was sent.
    pub async fn request(&self, email: &str) {
        self.session
            .request_code(email)
            .await
            .expect("code request failed");
    }

    /// Full sign-in with the default accepted code.
    pub async fn sign_in(&self, email: &str) -> SessionSnapshot {
        self.request(email).await;
        self.session
            .verify_code(email, platform_client::memory::DEFAULT_ACCEPTED_CODE)
            .await
            .expect("verification failed");
        self.settle().await
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.session.shutdown();
    }
}
