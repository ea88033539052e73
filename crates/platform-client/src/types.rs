//! Wire types shared by every auth adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sessions this close to expiry are refreshed before use.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// Identity as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    /// Email, or the empty string for identities without one.
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Seconds the access token is valid for, as issued.
    #[serde(default)]
    pub expires_in: i64,
    /// Unix timestamp (seconds) at which the access token expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Expiry as a timestamp, if the session carries one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }

    /// True if the access token is expired, or expires within
    /// [`EXPIRY_MARGIN_SECS`] of `now`. Sessions without an expiry never
    /// expire locally.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - EXPIRY_MARGIN_SECS <= now.timestamp(),
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Asynchronous auth-state notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// A notification pushed by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthChange {
    pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }
}

/// Options for sending a one-time code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpOptions {
    /// Create the account if the email is unknown.
    pub should_create_user: bool,
    /// Where the magic-link variant of the email points.
    pub email_redirect_to: Option<String>,
}

impl Default for OtpOptions {
    fn default() -> Self {
        Self {
            should_create_user: true,
            email_redirect_to: None,
        }
    }
}

/// Outcome of a successful code verification. Either part may be missing
/// when the service acknowledges without returning it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_at(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at,
            user: AuthUser {
                id: "u-1".into(),
                email: Some("a@example.com".into()),
            },
        }
    }

    #[test]
    fn expiry_honours_margin() {
        let now = Utc::now();
        let ts = now.timestamp();

        assert!(session_expiring_at(Some(ts - 1)).is_expired_at(now));
        assert!(session_expiring_at(Some(ts + EXPIRY_MARGIN_SECS - 1)).is_expired_at(now));
        assert!(!session_expiring_at(Some(ts + 3600)).is_expired_at(now));
        assert!(!session_expiring_at(None).is_expired_at(now));
    }

    #[test]
    fn session_parses_platform_payload() {
        let json = r#"{
            "access_token": "eyJ.a.b",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1760000000,
            "refresh_token": "r-1",
            "user": { "id": "u-1", "email": "a@example.com", "aud": "authenticated" }
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.user.id, "u-1");
        assert_eq!(session.expires_at().unwrap().timestamp(), 1_760_000_000);
    }

    #[test]
    fn auth_event_wire_names() {
        assert_eq!(
            serde_json::to_string(&AuthEvent::TokenRefreshed).unwrap(),
            "\"TOKEN_REFRESHED\""
        );
    }
}
