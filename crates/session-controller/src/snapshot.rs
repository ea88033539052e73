//! Observable session state.

use crate::SessionPhase;
use serde::{Deserialize, Serialize};

/// The signed-in user as the storefront sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    /// Only ever true when read from a stored profile row.
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    /// Minimal non-admin user used when the profile cannot be read or created.
    pub fn fallback(id: &str, email: &str) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            display_name: email.to_string(),
            is_admin: false,
            avatar_url: None,
        }
    }
}

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_user: Option<CurrentUser>,
    /// An operation is in flight.
    pub loading: bool,
    /// Message of the most recent failed operation.
    pub last_error: Option<String>,
    /// Email a code was sent to and not yet verified.
    pub pending_email: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Initializing,
            current_user: None,
            loading: true,
            last_error: None,
            pending_email: None,
        }
    }
}

impl SessionSnapshot {
    /// Restore has finished and no operation is in flight.
    pub fn is_settled(&self) -> bool {
        !self.loading && self.phase != SessionPhase::Initializing
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(|user| user.is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_snapshot_is_loading() {
        let snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.phase, SessionPhase::Initializing);
        assert!(snapshot.loading);
        assert!(!snapshot.is_settled());
        assert!(!snapshot.is_admin());
    }

    #[test]
    fn fallback_user_is_never_admin() {
        let user = CurrentUser::fallback("u-1", "a@example.com");
        assert!(!user.is_admin);
        assert_eq!(user.display_name, "a@example.com");
    }
}
