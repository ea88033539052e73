//! Session state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//!                  ┌─────────────────┐
//!                  │  Initializing   │ (initial)
//!                  └────────┬────────┘
//!       SessionRestored     │     RestoreFailed
//!     ┌─────────────────────┴──────────────────────┐
//!     ▼                                            ▼
//! ┌─────────────────┐   SignOutRequested   ┌─────────────────┐
//! │  Authenticated  │ ───────────────────► │    Anonymous    │
//! │                 │   RemoteSignedOut    │                 │
//! └─────────────────┘                      └────────┬────────┘
//!     ▲        ▲                                    │ CodeRequested
//!     │        │ RemoteSignedIn (from any           ▼
//!     │        │ settled state)            ┌─────────────────┐
//!     │        └────────────────────────── │  AwaitingCode   │
//!     │              CodeVerified          └─────────────────┘
//!     └───────────────────────────────────────────────┘
//! ```
//!
//! A failed verification is not an input: the phase stays where it was.
//! `RemoteSignedOut` only moves `Authenticated`; the notification that
//! follows the sign-out issued before every code request must not discard
//! the pending email.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Initializing)

    Initializing => {
        SessionRestored => Authenticated,
        RestoreFailed => Anonymous
    },
    Anonymous => {
        CodeRequested => AwaitingCode,
        RequestFailed => Anonymous,
        CodeVerified => Authenticated,
        SignOutRequested => Anonymous,
        RemoteSignedIn => Authenticated,
        RemoteSignedOut => Anonymous
    },
    AwaitingCode => {
        CodeRequested => AwaitingCode,
        RequestFailed => Anonymous,
        CodeVerified => Authenticated,
        SignOutRequested => Anonymous,
        RemoteSignedIn => Authenticated,
        RemoteSignedOut => AwaitingCode
    },
    Authenticated => {
        CodeVerified => Authenticated,
        SignOutRequested => Anonymous,
        RemoteSignedIn => Authenticated,
        RemoteSignedOut => Anonymous
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Public view of the session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Restoring a stored session on start-up.
    Initializing,
    /// No user.
    Anonymous,
    /// A code was sent and not yet verified.
    AwaitingCode,
    /// Signed in with a resolved profile.
    Authenticated,
}

impl SessionPhase {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionPhase::Authenticated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Initializing => "initializing",
            SessionPhase::Anonymous => "anonymous",
            SessionPhase::AwaitingCode => "awaiting_code",
            SessionPhase::Authenticated => "authenticated",
        }
    }
}

impl From<&SessionMachineState> for SessionPhase {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Initializing => SessionPhase::Initializing,
            SessionMachineState::Anonymous => SessionPhase::Anonymous,
            SessionMachineState::AwaitingCode => SessionPhase::AwaitingCode,
            SessionMachineState::Authenticated => SessionPhase::Authenticated,
        }
    }
}
