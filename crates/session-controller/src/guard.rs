//! Route gating on top of a session snapshot.
//!
//! Guards are presentation-level only; the data service enforces access
//! on its own.

use crate::{SessionPhase, SessionSnapshot};
use serde::{Deserialize, Serialize};

/// What a gated surface should do for a given snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session is still being resolved; show a loading state.
    Wait,
    /// Send the visitor to the login page.
    RedirectToLogin,
    /// Show the protected content.
    Render,
}

fn resolving(snapshot: &SessionSnapshot) -> bool {
    snapshot.loading || snapshot.phase == SessionPhase::Initializing
}

/// Gate for admin-only surfaces.
pub fn admin_guard(snapshot: &SessionSnapshot) -> GuardDecision {
    if resolving(snapshot) {
        GuardDecision::Wait
    } else if snapshot.is_admin() {
        GuardDecision::Render
    } else {
        GuardDecision::RedirectToLogin
    }
}

/// Gate for surfaces that need any signed-in user.
pub fn member_guard(snapshot: &SessionSnapshot) -> GuardDecision {
    if resolving(snapshot) {
        GuardDecision::Wait
    } else if snapshot.is_authenticated() {
        GuardDecision::Render
    } else {
        GuardDecision::RedirectToLogin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CurrentUser;

    fn settled(user: Option<CurrentUser>) -> SessionSnapshot {
        SessionSnapshot {
            phase: if user.is_some() {
                SessionPhase::Authenticated
            } else {
                SessionPhase::Anonymous
            },
            current_user: user,
            loading: false,
            last_error: None,
            pending_email: None,
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            is_admin: true,
            ..CurrentUser::fallback("u-1", "owner@inkleaf.studio")
        }
    }

    #[test]
    fn waits_while_initializing() {
        let snapshot = SessionSnapshot::default();
        assert_eq!(admin_guard(&snapshot), GuardDecision::Wait);
        assert_eq!(member_guard(&snapshot), GuardDecision::Wait);
    }

    #[test]
    fn waits_while_loading_even_for_admin() {
        let mut snapshot = settled(Some(admin()));
        snapshot.loading = true;
        assert_eq!(admin_guard(&snapshot), GuardDecision::Wait);
    }

    #[test]
    fn anonymous_is_redirected() {
        let snapshot = settled(None);
        assert_eq!(admin_guard(&snapshot), GuardDecision::RedirectToLogin);
        assert_eq!(member_guard(&snapshot), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn non_admin_member_is_redirected_from_admin() {
        let snapshot = settled(Some(CurrentUser::fallback("u-2", "a@example.com")));
        assert_eq!(admin_guard(&snapshot), GuardDecision::RedirectToLogin);
        assert_eq!(member_guard(&snapshot), GuardDecision::Render);
    }

    #[test]
    fn admin_renders() {
        let snapshot = settled(Some(admin()));
        assert_eq!(admin_guard(&snapshot), GuardDecision::Render);
    }
}
