//! Negotiation ledger - persistence seam and in-memory event log.
//!
//! The orchestrator records every state change as a [`NegotiationEvent`] and
//! every successful negotiation as an [`Agreement`]. Storage sits behind the
//! [`Persistence`] trait; [`InMemoryLedger`] keeps a bounded event log for
//! tests, the CLI and deployments that export elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use profile::{ActorId, Side, Terms};

use crate::negotiation::NegotiationStatus;
use crate::types::{ActionKind, Agreement, NegotiationId, Result};

/// Maximum events retained before pruning.
const DEFAULT_MAX_EVENTS: usize = 10_000;

/// What happened in a negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Negotiation opened
    Created { compatibility: f64 },
    /// Terms put on the table for a round
    ProposalIssued { round: u32, terms: Terms },
    /// One side evaluated the current proposal
    DecisionRendered {
        side: Side,
        actor: ActorId,
        overall: f64,
        accept: bool,
        recommendation: ActionKind,
    },
    /// Status changed
    StateTransition {
        from: NegotiationStatus,
        to: NegotiationStatus,
    },
    /// Agreement reached
    AgreementReached { agreement_id: String },
}

/// An entry in the negotiation ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationEvent {
    /// Unique event ID
    pub id: String,
    /// Negotiation the event belongs to
    pub negotiation_id: NegotiationId,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub kind: EventKind,
}

impl NegotiationEvent {
    /// Create an event stamped now.
    pub fn new(negotiation_id: NegotiationId, kind: EventKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            negotiation_id,
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Storage for negotiation outcomes.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Store an agreement. Saving the same agreement twice is a no-op.
    async fn save_agreement(&self, agreement: &Agreement) -> Result<()>;

    /// Append an event to the log.
    async fn append_event(&self, event: &NegotiationEvent) -> Result<()>;
}

/// In-memory persistence with a bounded event log.
pub struct InMemoryLedger {
    /// Events (newest first)
    events: Arc<RwLock<VecDeque<NegotiationEvent>>>,
    /// Agreements by negotiation
    agreements: DashMap<NegotiationId, Agreement>,
    /// Maximum events to retain
    max_events: usize,
}

impl InMemoryLedger {
    /// Create a ledger with the default capacity.
    pub fn new() -> Self {
        Self::with_max_events(DEFAULT_MAX_EVENTS)
    }

    /// Create with custom capacity.
    pub fn with_max_events(max_events: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(VecDeque::new())),
            agreements: DashMap::new(),
            max_events: max_events.max(1),
        }
    }

    /// Get recent events, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<NegotiationEvent> {
        let events = self.events.read().await;
        events.iter().take(limit).cloned().collect()
    }

    /// Events of one negotiation, oldest first.
    pub async fn events_for(&self, id: &NegotiationId) -> Vec<NegotiationEvent> {
        let events = self.events.read().await;
        events
            .iter()
            .rev()
            .filter(|e| &e.negotiation_id == id)
            .cloned()
            .collect()
    }

    /// Agreement reached by a negotiation.
    pub fn agreement(&self, id: &NegotiationId) -> Option<Agreement> {
        self.agreements.get(id).map(|a| a.value().clone())
    }

    /// All stored agreements.
    pub fn agreements(&self) -> Vec<Agreement> {
        self.agreements.iter().map(|a| a.value().clone()).collect()
    }

    /// Get statistics.
    pub async fn stats(&self) -> LedgerStats {
        let events = self.events.read().await;

        let transitions_to = |status: NegotiationStatus| {
            events
                .iter()
                .filter(|e| matches!(&e.kind, EventKind::StateTransition { to, .. } if *to == status))
                .count()
        };

        LedgerStats {
            total_events: events.len(),
            created: events
                .iter()
                .filter(|e| matches!(e.kind, EventKind::Created { .. }))
                .count(),
            proposals: events
                .iter()
                .filter(|e| matches!(e.kind, EventKind::ProposalIssued { .. }))
                .count(),
            agreed: transitions_to(NegotiationStatus::Agreed),
            rejected: transitions_to(NegotiationStatus::Rejected),
            expired: transitions_to(NegotiationStatus::Expired),
            agreements: self.agreements.len(),
        }
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Clear events and agreements.
    pub async fn clear(&self) {
        self.events.write().await.clear();
        self.agreements.clear();
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Persistence for InMemoryLedger {
    async fn save_agreement(&self, agreement: &Agreement) -> Result<()> {
        self.agreements
            .entry(agreement.negotiation_id.clone())
            .or_insert_with(|| agreement.clone());
        Ok(())
    }

    async fn append_event(&self, event: &NegotiationEvent) -> Result<()> {
        let mut events = self.events.write().await;
        events.push_front(event.clone());

        while events.len() > self.max_events {
            events.pop_back();
        }
        Ok(())
    }
}

/// Statistics from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerStats {
    /// Events retained
    pub total_events: usize,
    /// Negotiations opened
    pub created: usize,
    /// Proposals issued
    pub proposals: usize,
    /// Negotiations that reached agreement
    pub agreed: usize,
    /// Negotiations rejected
    pub rejected: usize,
    /// Negotiations that ran out of time
    pub expired: usize,
    /// Agreements stored
    pub agreements: usize,
}
