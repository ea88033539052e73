//! Contracts and adapters for the hosted backend platform.
//!
//! The storefront never implements auth, relational storage or file
//! storage itself. It talks to them through three traits:
//!
//! - [`AuthService`]: email one-time codes, the current session, sign-out and
//!   asynchronous auth notifications
//! - [`DataStore`]: row-level select / insert / update / delete
//! - [`ObjectStorage`]: bucketed uploads
//!
//! [`supabase`] implements them over the platform's REST API, and [`memory`]
//! in-process for tests and offline use.

mod auth;
mod data;
mod error;
pub mod memory;
mod objects;
pub mod supabase;
mod types;

pub use auth::AuthService;
pub use data::{DataStore, Filter, Order};
pub use error::{PlatformError, PlatformResult, NO_ROWS_CODE, UNIQUE_VIOLATION_CODE};
pub use objects::ObjectStorage;
pub use types::{
    AuthChange, AuthEvent, AuthUser, OtpOptions, Session, Verification, EXPIRY_MARGIN_SECS,
};
