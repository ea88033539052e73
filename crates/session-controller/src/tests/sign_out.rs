//! Explicit sign-out.

use super::harness::{TestHarness, EMAIL};
use crate::SessionPhase;
use inkleaf_storage::LocalStore;
use platform_client::memory::{AuthOperation, Behavior};

#[tokio::test]
async fn test_request_then_sign_out_clears_pending_email() {
    let h = TestHarness::new();
    h.ready().await;
    h.request(EMAIL).await;

    h.session.sign_out().await.unwrap();

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert!(snapshot.pending_email.is_none());
    assert!(snapshot.current_user.is_none());
}

#[tokio::test]
async fn test_sign_out_after_sign_in() {
    let h = TestHarness::new();
    h.ready().await;
    h.sign_in(EMAIL).await;

    h.session.sign_out().await.unwrap();

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert!(snapshot.current_user.is_none());
    assert!(h.auth.stored_session().is_none());
}

#[tokio::test]
async fn test_sign_out_clears_both_scopes_when_remote_fails() {
    let h = TestHarness::new();
    h.ready().await;
    h.sign_in(EMAIL).await;
    h.storage.session.set("checkout-step", "2").unwrap();
    h.storage.persistent.set("sb-demo-auth-token", "{}").unwrap();
    h.storage.persistent.set("cart", "[]").unwrap();
    h.auth
        .set_behavior(AuthOperation::SignOut, Behavior::Unavailable);

    h.session.sign_out().await.unwrap();

    assert!(h.storage.session.keys().unwrap().is_empty());
    assert!(h.storage.persistent.keys().unwrap().is_empty());
    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert!(snapshot.current_user.is_none());
    assert!(snapshot.last_error.is_none());
}

#[tokio::test]
async fn test_hanging_remote_sign_out_still_signs_out_locally() {
    let h = TestHarness::new();
    h.ready().await;
    h.sign_in(EMAIL).await;
    h.storage.persistent.set("cart", "[]").unwrap();
    h.auth.set_behavior(AuthOperation::SignOut, Behavior::Hang);

    h.session.sign_out().await.unwrap();

    assert!(h.storage.persistent.keys().unwrap().is_empty());
    assert_eq!(h.session.snapshot().phase, SessionPhase::Anonymous);
    assert!(!h.session.snapshot().loading);
}

#[tokio::test]
async fn test_sign_out_when_anonymous_is_harmless() {
    let h = TestHarness::new();
    h.ready().await;

    h.session.sign_out().await.unwrap();

    assert_eq!(h.settle().await.phase, SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_sign_out_clears_file_backed_storage() {
    use platform_client::memory::{MemoryAuthService, MemoryDataStore};
    use std::sync::Arc;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.json");
    let storage = inkleaf_storage::create_scopes(&path).unwrap();
    storage.persistent.set("sb-demo-auth-token", "{}").unwrap();

    let h = TestHarness::build_with_storage(
        Arc::new(MemoryAuthService::new()),
        Arc::new(MemoryDataStore::new()),
        storage,
    );
    h.ready().await;
    h.session.sign_out().await.unwrap();

    let reopened = inkleaf_storage::FileStore::open(&path).unwrap();
    assert!(reopened.keys().unwrap().is_empty());
}
