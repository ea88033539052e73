//! Auth notifications.

use super::harness::{TestHarness, EMAIL};
use crate::SessionPhase;
use platform_client::memory::{AuthOperation, DEFAULT_ACCEPTED_CODE};
use platform_client::{AuthChange, AuthEvent, AuthService, OtpOptions};

#[tokio::test]
async fn test_remote_sign_out_while_authenticated() {
    let h = TestHarness::new();
    h.ready().await;
    h.sign_in(EMAIL).await;
    let sign_outs = h.auth.calls(AuthOperation::SignOut);

    h.auth.sign_out_elsewhere();

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert!(snapshot.current_user.is_none());
    // No local sign-out call in response.
    assert_eq!(h.auth.calls(AuthOperation::SignOut), sign_outs);
}

#[tokio::test]
async fn test_stale_sign_out_keeps_live_session() {
    let h = TestHarness::new();
    h.ready().await;
    h.sign_in(EMAIL).await;

    // Late delivery of the sign-out that preceded this sign-in.
    h.auth.emit(AuthChange::new(AuthEvent::SignedOut, None));

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.current_user.unwrap().email, EMAIL);
}

#[tokio::test]
async fn test_remote_sign_out_does_not_drop_pending_code() {
    let h = TestHarness::new();
    h.ready().await;
    h.request(EMAIL).await;

    h.auth.sign_out_elsewhere();

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::AwaitingCode);
    assert_eq!(snapshot.pending_email.as_deref(), Some(EMAIL));
}

#[tokio::test]
async fn test_remote_sign_in_authenticates() {
    let h = TestHarness::new();
    h.ready().await;
    h.request(EMAIL).await;

    // Completed in another window sharing the same auth service.
    h.auth
        .send_one_time_code(EMAIL, &OtpOptions::default())
        .await
        .unwrap();
    h.auth
        .verify_one_time_code(EMAIL, DEFAULT_ACCEPTED_CODE)
        .await
        .unwrap();

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert!(snapshot.pending_email.is_none());
    assert_eq!(snapshot.current_user.unwrap().email, EMAIL);
}

#[tokio::test]
async fn test_token_refresh_keeps_user() {
    let h = TestHarness::new();
    h.ready().await;
    let before = h.sign_in(EMAIL).await.current_user.unwrap();

    assert!(h.auth.refresh_elsewhere().is_some());

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.current_user.unwrap().id, before.id);
}

#[tokio::test]
async fn test_stale_sign_in_is_ignored() {
    let h = TestHarness::new();
    h.ready().await;
    assert!(h.sign_in(EMAIL).await.is_authenticated());
    let stored = h.auth.stored_session().unwrap();
    h.session.sign_out().await.unwrap();
    h.settle().await;

    // Delivered after the sign-out it predates.
    h.auth
        .emit(AuthChange::new(AuthEvent::SignedIn, Some(stored)));

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert!(snapshot.current_user.is_none());
}

#[tokio::test]
async fn test_notification_for_other_user_is_ignored() {
    let h = TestHarness::new();
    h.ready().await;
    let signed_in = h.sign_in(EMAIL).await.current_user.unwrap();

    let mut foreign = h.auth.stored_session().unwrap();
    foreign.user.id = "someone-else".to_string();
    h.auth
        .emit(AuthChange::new(AuthEvent::SignedIn, Some(foreign)));

    let snapshot = h.settle().await;
    assert_eq!(snapshot.current_user.unwrap().id, signed_in.id);
}

#[tokio::test]
async fn test_notifications_do_not_toggle_loading() {
    let h = TestHarness::new();
    h.ready().await;
    h.sign_in(EMAIL).await;
    let mut updates = h.session.subscribe();
    let _ = updates.borrow_and_update();

    h.auth.refresh_elsewhere();
    h.settle().await;

    assert!(!updates.borrow_and_update().loading);
}

#[tokio::test]
async fn test_sign_out_notification_while_anonymous_is_ignored() {
    let h = TestHarness::new();
    h.ready().await;

    h.auth.emit(AuthChange::new(AuthEvent::SignedOut, None));

    let snapshot = h.settle().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert!(snapshot.last_error.is_none());
}
