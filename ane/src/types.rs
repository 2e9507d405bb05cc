//! Core types for the negotiation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use profile::{ActorId, ProfileError, Side, Terms};

/// Unique identifier of a negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NegotiationId(pub String);

impl NegotiationId {
    /// Generate a fresh ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the raw ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NegotiationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NegotiationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NegotiationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// What an actor knows about the negotiation when evaluating a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationContext {
    /// Which side of the terms the evaluating actor is on
    pub side: Side,
    /// Current round (starts at 1)
    pub round: u32,
    /// Proposals from earlier rounds, oldest first
    pub prior_proposals: Vec<Terms>,
    /// Fraction of the time budget already used (0.0 - 1.0)
    pub deadline_ratio: Option<f64>,
    /// Other live options the actor has
    pub competitive_alternatives: u32,
    /// Agreements previously reached with this counterpart
    pub prior_agreements: u32,
}

impl NegotiationContext {
    /// Context for a first round with no history.
    pub fn first_round(side: Side) -> Self {
        Self {
            side,
            round: 1,
            prior_proposals: Vec::new(),
            deadline_ratio: None,
            competitive_alternatives: 0,
            prior_agreements: 0,
        }
    }

    /// Set the deadline ratio.
    pub fn with_deadline_ratio(mut self, ratio: f64) -> Self {
        self.deadline_ratio = Some(ratio);
        self
    }

    /// Set the number of competitive alternatives.
    pub fn with_alternatives(mut self, count: u32) -> Self {
        self.competitive_alternatives = count;
        self
    }

    /// Set the number of prior agreements.
    pub fn with_prior_agreements(mut self, count: u32) -> Self {
        self.prior_agreements = count;
        self
    }
}

/// Scores for the six decision criteria (each 0.0 - 1.0, higher is better).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionScores {
    /// Priority-weighted share of needs met
    pub needs_satisfaction: f64,
    /// Value received relative to the cost of what is given
    pub cost_efficiency: f64,
    /// Inverted accumulated risk
    pub risk: f64,
    /// Progress toward the actor's goals
    pub strategic_alignment: f64,
    /// Fit of the timeline with urgency and deadline pressure
    pub timing: f64,
    /// Value of the relationship with the counterpart
    pub relationship: f64,
}

impl CriterionScores {
    /// Scores in canonical criterion order.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.needs_satisfaction,
            self.cost_efficiency,
            self.risk,
            self.strategic_alignment,
            self.timing,
            self.relationship,
        ]
    }

    /// Population variance across the six scores.
    pub fn variance(&self) -> f64 {
        let values = self.as_array();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
    }
}

/// Kind of move an actor can make in response to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Take the terms as they are
    Accept,
    /// Walk away
    Reject,
    /// Respond with modified terms
    Counter,
    /// Ask for missing details before deciding
    RequestClarification,
    /// Propose a different kind of exchange
    ProposeAlternative,
}

impl ActionKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Accept => "accept",
            ActionKind::Reject => "reject",
            ActionKind::Counter => "counter",
            ActionKind::RequestClarification => "request_clarification",
            ActionKind::ProposeAlternative => "propose_alternative",
        }
    }
}

/// A possible response with its expected payoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeAction {
    /// Kind of response
    pub kind: ActionKind,
    /// What the response means
    pub description: String,
    /// What is likely to happen
    pub expected_outcome: String,
    /// Probability the response works out (0.0 - 1.0)
    pub success_probability: f64,
    /// Probability-weighted value
    pub expected_value: f64,
}

/// Named outcome used in scenario analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Everything goes to plan
    BestCase,
    /// Typical execution
    ExpectedCase,
    /// Execution goes badly
    WorstCase,
    /// No agreement is reached
    NoDeal,
}

/// One outcome of the proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Which outcome
    pub kind: ScenarioKind,
    /// Probability (scenario probabilities sum to 1)
    pub probability: f64,
    /// Value to the actor if it happens (0.0 - 1.0)
    pub value: f64,
}

/// Outcome distribution of a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    /// Exactly four scenarios: best, expected, worst, no deal
    pub scenarios: Vec<Scenario>,
    /// Sum of probability times value
    pub expected_value: f64,
}

/// One actor's multi-criteria evaluation of one proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionAnalysis {
    /// Evaluating actor
    pub actor_id: ActorId,
    /// Round the proposal belongs to
    pub round: u32,
    /// Per-criterion scores
    pub scores: CriterionScores,
    /// Weighted overall score (0.0 - 1.0)
    pub overall: f64,
    /// Whether the actor should accept
    pub accept: bool,
    /// Top-ranked alternative
    pub recommendation: ActionKind,
    /// Confidence in the recommendation (0.1 - 0.95)
    pub confidence: f64,
    /// Weaknesses of the proposal
    pub concerns: Vec<String>,
    /// Strengths of the proposal
    pub strengths: Vec<String>,
    /// Alternatives ranked by expected value
    pub alternatives: Vec<AlternativeAction>,
    /// Outcome scenarios
    pub scenarios: ScenarioAnalysis,
}

/// Follow-up action attached to an agreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextStep {
    /// What has to happen
    pub description: String,
    /// Who is responsible
    pub owner: ActorId,
    /// Days after signing it is due
    pub due_in_days: u32,
}

/// Final artifact of a successful negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agreement {
    /// Unique agreement ID
    pub id: String,
    /// Negotiation that produced it
    pub negotiation_id: NegotiationId,
    /// Initiating actor
    pub actor_a: ActorId,
    /// Counterpart
    pub actor_b: ActorId,
    /// Terms both sides accepted
    pub terms: Terms,
    /// Forward compatibility score of the pair
    pub compatibility: f64,
    /// Overall decision score of actor A
    pub score_a: f64,
    /// Overall decision score of actor B
    pub score_b: f64,
    /// Round in which agreement was reached
    pub round: u32,
    /// When the agreement was created
    pub created_at: DateTime<Utc>,
    /// Follow-up actions
    pub next_steps: Vec<NextStep>,
}

/// Error types for the engine.
#[derive(Debug, thiserror::Error)]
pub enum AneError {
    /// Malformed or missing required input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Mutation attempted on a negotiation in a terminal state
    #[error("Invalid state transition for negotiation {id}: {from} -> {to}")]
    InvalidStateTransition { id: String, from: String, to: String },

    /// Unknown actor or negotiation
    #[error("Not found: {0}")]
    NotFound(String),

    /// Negotiation is busy in another round
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence collaborator failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Background task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProfileError> for AneError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(id) => AneError::NotFound(format!("actor {}", id)),
            invalid @ ProfileError::Invalid { .. } => AneError::InvalidInput(invalid.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AneError>;
