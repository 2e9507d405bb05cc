//! Negotiation lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

use profile::Side;

/// Status of a negotiation.
///
/// ```text
/// Initiated → Proposed → (Countered → Proposed)* → Agreed | Rejected | Expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStatus {
    /// Pair registered, no proposal yet
    Initiated,
    /// Terms on the table awaiting evaluation
    Proposed,
    /// At least one side asked for changes
    Countered,
    /// Both sides accepted
    Agreed,
    /// Ended without agreement before the deadline
    Rejected,
    /// The time budget ran out
    Expired,
}

impl NegotiationStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationStatus::Initiated => "initiated",
            NegotiationStatus::Proposed => "proposed",
            NegotiationStatus::Countered => "countered",
            NegotiationStatus::Agreed => "agreed",
            NegotiationStatus::Rejected => "rejected",
            NegotiationStatus::Expired => "expired",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NegotiationStatus::Agreed | NegotiationStatus::Rejected | NegotiationStatus::Expired
        )
    }

    /// Whether moving to `next` is allowed.
    pub fn can_transition_to(&self, next: NegotiationStatus) -> bool {
        use NegotiationStatus::*;
        matches!(
            (self, next),
            (Initiated, Proposed)
                | (Initiated, Rejected)
                | (Initiated, Expired)
                | (Proposed, Agreed)
                | (Proposed, Rejected)
                | (Proposed, Countered)
                | (Proposed, Expired)
                | (Countered, Proposed)
                | (Countered, Rejected)
                | (Countered, Expired)
        )
    }
}

impl fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a negotiation reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Both sides accepted the same terms
    MutualAccept,
    /// One side's analysis recommended rejection
    RejectedBy(Side),
    /// No agreement within the allowed rounds
    RoundLimitExceeded,
    /// Counter-offers left unaccepted terms unchanged
    Stalemate,
    /// Neither side offers anything the other could receive
    NothingToExchange,
    /// Deadline passed
    Expired,
    /// Cancelled by the caller
    Cancelled,
}
