//! Admin checks for content mutations.

use crate::{StorefrontError, StorefrontResult};
use session_controller::{admin_guard, CurrentUser, GuardDecision, SessionSnapshot};
use tracing::warn;

/// Fail unless `actor` is an admin.
pub fn require_admin(actor: &CurrentUser) -> StorefrontResult<()> {
    if actor.is_admin {
        Ok(())
    } else {
        warn!(user_id = %actor.id, "content change refused for non-admin");
        Err(StorefrontError::Forbidden)
    }
}

/// The admin behind `snapshot`, if the admin guard would render.
pub fn admin_from(snapshot: &SessionSnapshot) -> StorefrontResult<&CurrentUser> {
    match (admin_guard(snapshot), &snapshot.current_user) {
        (GuardDecision::Render, Some(user)) => Ok(user),
        _ => Err(StorefrontError::Forbidden),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use session_controller::SessionPhase;

    pub(crate) fn admin() -> CurrentUser {
        CurrentUser {
            is_admin: true,
            ..CurrentUser::fallback("admin-1", "owner@inkleaf.studio")
        }
    }

    pub(crate) fn member() -> CurrentUser {
        CurrentUser::fallback("u-1", "a@example.com")
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&admin()).is_ok());
        assert!(matches!(
            require_admin(&member()),
            Err(StorefrontError::Forbidden)
        ));
    }

    #[test]
    fn test_admin_from_snapshot() {
        let mut snapshot = SessionSnapshot {
            phase: SessionPhase::Authenticated,
            current_user: Some(admin()),
            loading: false,
            last_error: None,
            pending_email: None,
        };
        assert_eq!(admin_from(&snapshot).unwrap().id, "admin-1");

        snapshot.loading = true;
        assert!(admin_from(&snapshot).is_err());
    }
}
