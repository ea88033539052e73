//! In-process adapters for tests and offline demos.
//!
//! Each adapter can be told to fail or hang per operation so callers can
//! exercise their error and deadline paths.

mod auth;
mod data;
mod objects;

pub use auth::{AuthOperation, MemoryAuthService, DEFAULT_ACCEPTED_CODE};
pub use data::MemoryDataStore;
pub use objects::MemoryObjectStorage;

use crate::{PlatformError, PlatformResult};

/// How an in-memory adapter answers the next calls of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Behavior {
    /// Behave like a healthy service.
    #[default]
    Succeed,
    /// Fail with a non-transient platform error carrying this message.
    Fail(String),
    /// Fail with a 503, which callers treat as transient.
    Unavailable,
    /// Never answer.
    Hang,
}

impl Behavior {
    /// Apply the behavior: returns early with an error, never returns for
    /// `Hang`, and returns `Ok(())` for `Succeed`.
    pub(crate) async fn apply(self) -> PlatformResult<()> {
        match self {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(message) => Err(PlatformError::Api {
                status: 400,
                code: None,
                message,
            }),
            Behavior::Unavailable => Err(PlatformError::Api {
                status: 503,
                code: None,
                message: "service unavailable".to_string(),
            }),
            Behavior::Hang => std::future::pending().await,
        }
    }
}
