//! Errors surfaced by the hosted platform adapters.

use thiserror::Error;

/// PostgREST code for "the result contains 0 rows" on a single-row read.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Postgres unique-violation code.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

#[derive(Error, Debug)]
pub enum PlatformError {
    /// Error payload from the auth server or PostgREST.
    #[error("platform rejected the request (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("no matching row")]
    NoRows,

    #[error("row already exists: {0}")]
    Conflict(String),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("could not refresh the session after {0} attempts")]
    RefreshExhausted(u32),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Storage(#[from] inkleaf_storage::StorageError),

    #[error("misconfigured platform client: {0}")]
    Config(String),
}

impl PlatformError {
    /// Build an error from a status and a parsed error code.
    ///
    /// Maps the platform's "no rows" and unique-violation codes onto
    /// [`PlatformError::NoRows`] and [`PlatformError::Conflict`].
    pub fn from_api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        match code.as_deref() {
            Some(NO_ROWS_CODE) => PlatformError::NoRows,
            Some(UNIQUE_VIOLATION_CODE) => PlatformError::Conflict(message),
            _ if status == 409 => PlatformError::Conflict(message),
            _ => PlatformError::Api {
                status,
                code,
                message,
            },
        }
    }

    /// Worth retrying: connection failures, client timeouts, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            PlatformError::Http(e) => {
                e.is_connect()
                    || e.is_timeout()
                    || e.status().is_some_and(|status| status.is_server_error())
            }
            PlatformError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the platform rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PlatformError::Api { status: 401 | 403, .. })
            || matches!(self, PlatformError::NotAuthenticated)
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_code_maps_to_no_rows() {
        let err = PlatformError::from_api(406, Some(NO_ROWS_CODE.into()), "0 rows");
        assert!(matches!(err, PlatformError::NoRows));
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = PlatformError::from_api(409, Some(UNIQUE_VIOLATION_CODE.into()), "dup key");
        assert!(matches!(err, PlatformError::Conflict(m) if m == "dup key"));
    }

    #[test]
    fn other_codes_stay_api_errors() {
        let err = PlatformError::from_api(400, Some("otp_expired".into()), "expired");
        assert!(matches!(err, PlatformError::Api { status: 400, .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(PlatformError::from_api(503, None, "down").is_transient());
        assert!(PlatformError::from_api(429, None, "slow down").is_transient());
    }

    #[test]
    fn no_rows_and_conflict_are_not_transient() {
        assert!(!PlatformError::NoRows.is_transient());
        assert!(!PlatformError::Conflict("x".into()).is_transient());
        assert!(!PlatformError::RefreshExhausted(3).is_transient());
    }

    #[test]
    fn unauthorized_detection() {
        assert!(PlatformError::from_api(401, None, "jwt expired").is_unauthorized());
        assert!(PlatformError::NotAuthenticated.is_unauthorized());
        assert!(!PlatformError::NoRows.is_unauthorized());
    }
}
