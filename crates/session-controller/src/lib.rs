//! Storefront session controller.
//!
//! Signs visitors in with an emailed one-time code, restores a stored
//! session on start, resolves the visitor's profile (creating it on first
//! sign-in) and exposes the result as a [`SessionSnapshot`] that the rest
//! of the storefront reads and gates on.
//!
//! ```no_run
//! # async fn demo(
//! #     auth: std::sync::Arc<dyn platform_client::AuthService>,
//! #     data: std::sync::Arc<dyn platform_client::DataStore>,
//! # ) -> session_controller::SessionResult<()> {
//! use session_controller::{SessionConfig, SessionController};
//!
//! let session = SessionController::start(
//!     auth,
//!     data,
//!     inkleaf_storage::StorageScopes::in_memory(),
//!     SessionConfig::default(),
//! );
//! session.wait_until_settled().await?;
//! session.request_code("reader@example.com").await?;
//! session.verify_code("reader@example.com", "123456").await?;
//! # Ok(())
//! # }
//! ```

mod controller;
mod deadline;
mod error;
mod guard;
mod profile;
mod session_fsm;
mod snapshot;
mod validate;
mod worker;

#[cfg(test)]
mod tests;

pub use controller::{SessionConfig, SessionController, DEFAULT_CALL_TIMEOUT};
pub use deadline::with_deadline;
pub use error::{ProfileLookupError, SessionError, SessionResult};
pub use guard::{admin_guard, member_guard, GuardDecision};
pub use profile::{ProfileRepository, ProfileRow, PROFILES_TABLE};
pub use session_fsm::{SessionMachine, SessionMachineInput, SessionMachineState, SessionPhase};
pub use snapshot::{CurrentUser, SessionSnapshot};
pub use validate::{normalize_code, normalize_email};
