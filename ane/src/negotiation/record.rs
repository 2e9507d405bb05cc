//! The negotiation record and its read-only snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use profile::{Actor, ActorId, Terms};

use crate::scoring::PairCompatibility;
use crate::types::{Agreement, AneError, DecisionAnalysis, NegotiationId, Result};

use super::state::{NegotiationStatus, TerminationReason};

/// Both sides' analyses of one round's proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDecisions {
    /// Round evaluated
    pub round: u32,
    /// Analysis of actor A
    pub a: DecisionAnalysis,
    /// Analysis of actor B
    pub b: DecisionAnalysis,
}

/// One entry of the status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: NegotiationStatus,
    pub to: NegotiationStatus,
    pub at: DateTime<Utc>,
}

/// Mutable state of a live negotiation. Owned by the orchestrator and only
/// touched under its per-negotiation lock.
#[derive(Debug, Clone)]
pub struct Negotiation {
    pub id: NegotiationId,
    pub actor_a: Arc<Actor>,
    pub actor_b: Arc<Actor>,
    pub compatibility: PairCompatibility,
    /// Proposals in round order
    pub proposals: Vec<Terms>,
    pub decisions: Vec<RoundDecisions>,
    /// Current round (0 until the first proposal)
    pub round: u32,
    pub max_rounds: u32,
    pub status: NegotiationStatus,
    pub history: Vec<StatusChange>,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub termination: Option<TerminationReason>,
    pub agreement: Option<Agreement>,
}

impl Negotiation {
    /// Create a negotiation in `Initiated`.
    pub fn new(
        id: NegotiationId,
        actor_a: Arc<Actor>,
        actor_b: Arc<Actor>,
        compatibility: PairCompatibility,
        max_rounds: u32,
        started_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            actor_a,
            actor_b,
            compatibility,
            proposals: Vec::new(),
            decisions: Vec::new(),
            round: 0,
            max_rounds,
            status: NegotiationStatus::Initiated,
            history: Vec::new(),
            started_at,
            deadline,
            completed_at: None,
            termination: None,
            agreement: None,
        }
    }

    /// Move to `to`, recording the change.
    pub fn transition(&mut self, to: NegotiationStatus) -> Result<StatusChange> {
        if !self.status.can_transition_to(to) {
            return Err(AneError::InvalidStateTransition {
                id: self.id.to_string(),
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        let change = StatusChange {
            from: self.status,
            to,
            at: Utc::now(),
        };
        self.status = to;
        self.history.push(change.clone());
        Ok(change)
    }

    /// Fraction of the time budget used at `now` (0.0 - 1.0).
    pub fn deadline_ratio(&self, now: DateTime<Utc>) -> f64 {
        let total = (self.deadline - self.started_at).num_milliseconds() as f64;
        if total <= 0.0 {
            return 1.0;
        }
        let elapsed = (now - self.started_at).num_milliseconds() as f64;
        (elapsed / total).clamp(0.0, 1.0)
    }

    /// Proposal currently on the table.
    pub fn current_terms(&self) -> Option<&Terms> {
        self.proposals.last()
    }

    /// Read-only view.
    pub fn snapshot(&self) -> NegotiationSnapshot {
        NegotiationSnapshot {
            id: self.id.clone(),
            actor_a: self.actor_a.id.clone(),
            actor_b: self.actor_b.id.clone(),
            status: self.status,
            round: self.round,
            max_rounds: self.max_rounds,
            compatibility: self.compatibility.forward.score,
            reverse_compatibility: self.compatibility.reverse.score,
            proposals: self.proposals.clone(),
            decisions: self.decisions.clone(),
            history: self.history.clone(),
            started_at: self.started_at,
            deadline: self.deadline,
            completed_at: self.completed_at,
            termination: self.termination,
            agreement: self.agreement.clone(),
        }
    }
}

/// Point-in-time copy of a negotiation, kept after it terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationSnapshot {
    pub id: NegotiationId,
    pub actor_a: ActorId,
    pub actor_b: ActorId,
    pub status: NegotiationStatus,
    pub round: u32,
    pub max_rounds: u32,
    /// A→B compatibility
    pub compatibility: f64,
    /// B→A compatibility
    pub reverse_compatibility: f64,
    pub proposals: Vec<Terms>,
    pub decisions: Vec<RoundDecisions>,
    pub history: Vec<StatusChange>,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub termination: Option<TerminationReason>,
    pub agreement: Option<Agreement>,
}

impl NegotiationSnapshot {
    /// Proposal currently on the table.
    pub fn current_terms(&self) -> Option<&Terms> {
        self.proposals.last()
    }
}
