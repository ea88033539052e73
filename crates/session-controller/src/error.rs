//! Session error types.

use std::time::Duration;
use thiserror::Error;

/// Why a profile lookup produced no row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookupError {
    /// The profile row does not exist yet
    #[error("no profile row")]
    NoRows,

    /// The query itself failed
    #[error("profile query failed: {0}")]
    Query(String),
}

/// Session controller error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The external auth service rejected or failed the call
    #[error("{0}")]
    AuthService(String),

    /// Reading or creating the profile failed
    #[error("Profile lookup failed: {0}")]
    ProfileLookup(#[from] ProfileLookupError),

    /// A collaborator call exceeded its deadline
    #[error("Timeout while waiting for {operation}")]
    Timeout { operation: String, after: Duration },

    /// Email rejected before calling out
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Code rejected before calling out
    #[error("Invalid code: expected 6 to 10 digits")]
    InvalidCode,

    /// The controller was shut down
    #[error("Session controller stopped")]
    ControllerStopped,

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}

impl From<platform_client::PlatformError> for SessionError {
    fn from(err: platform_client::PlatformError) -> Self {
        SessionError::AuthService(err.to_string())
    }
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
