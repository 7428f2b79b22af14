//! Request lifecycle as a plain state machine.
//!
//! ```text
//! pending ──begin──▶ in-progress ──complete──▶ completed
//!    │  └───────────────complete───────────────▲
//!    └──cancel──▶ cancelled ◀──cancel── in-progress
//! ```
//!
//! `complete` is crate-private: the only caller is the engine's confirmation
//! path, which performs the inventory and history bookkeeping first.

use serde::{Deserialize, Serialize};

use super::domain::RequestStatus;

/// Operations that move a request between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Match,
    Begin,
    Complete,
    Cancel,
}

impl Transition {
    pub const fn verb(self) -> &'static str {
        match self {
            Transition::Match => "be matched",
            Transition::Begin => "begin progress",
            Transition::Complete => "be allocated",
            Transition::Cancel => "be cancelled",
        }
    }
}

/// Rejected transition; carries the state the request was in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: RequestStatus,
    pub attempted: Transition,
}

impl RequestStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// Matching is read-only but only meaningful for open requests.
    pub fn ensure_matchable(self) -> Result<(), TransitionError> {
        if self.is_terminal() {
            Err(self.reject(Transition::Match))
        } else {
            Ok(())
        }
    }

    pub fn begin(self) -> Result<Self, TransitionError> {
        match self {
            RequestStatus::Pending => Ok(RequestStatus::InProgress),
            other => Err(other.reject(Transition::Begin)),
        }
    }

    pub(crate) fn complete(self) -> Result<Self, TransitionError> {
        match self {
            RequestStatus::Pending | RequestStatus::InProgress => Ok(RequestStatus::Completed),
            other => Err(other.reject(Transition::Complete)),
        }
    }

    pub fn cancel(self) -> Result<Self, TransitionError> {
        match self {
            RequestStatus::Pending | RequestStatus::InProgress => Ok(RequestStatus::Cancelled),
            other => Err(other.reject(Transition::Cancel)),
        }
    }

    fn reject(self, attempted: Transition) -> TransitionError {
        TransitionError {
            from: self,
            attempted,
        }
    }
}
