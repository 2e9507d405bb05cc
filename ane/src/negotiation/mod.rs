//! Negotiation - round-based state machine between two actors.
//!
//! Each round the current terms are evaluated by both sides:
//!
//! 1. **Both accept**: the negotiation is `Agreed` and an agreement is saved
//! 2. **Either recommends rejection**: the negotiation is `Rejected`
//! 3. **Otherwise**: sides that did not accept counter, and the merged
//!    terms become the next round's proposal
//!
//! A counter that leaves the terms unchanged ends the negotiation, as do
//! deadlines, round limits and cancellation.

mod orchestrator;
mod record;
mod registry;
mod state;

pub use orchestrator::{
    NegotiationOrchestrator, NegotiationRequest, OrchestratorBuilder, RejectionReason,
    StartOutcome,
};
pub use record::{Negotiation, NegotiationSnapshot, RoundDecisions, StatusChange};
pub use registry::{PairKey, PairRegistry};
pub use state::{NegotiationStatus, TerminationReason};
