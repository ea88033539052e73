//! Scenario tests for the session controller.
//!
//! - `harness.rs`  - controller wired to in-memory collaborators
//! - `login.rs`    - code request and verification
//! - `restore.rs`  - start-up restore, including deadline misses
//! - `sign_out.rs` - local and remote sign-out
//! - `events.rs`   - auth notifications and their ordering
//! - `profile.rs`  - profile bootstrap through the controller
//! - `shutdown.rs` - behavior after the controller stops

mod events;
pub(crate) mod harness;
mod sign_out;
