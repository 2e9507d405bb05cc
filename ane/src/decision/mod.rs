//! Decision analysis - multi-criteria evaluation of a proposal.
//!
//! An evaluation runs in four steps:
//!
//! 1. **Criteria**: six independent scores from the actor's profile and the terms
//! 2. **Weighting**: base weights reshaped by negotiation style and risk tolerance
//! 3. **Scenarios**: best, expected, worst and no-deal outcomes
//! 4. **Alternatives**: candidate responses ranked by expected value

mod alternatives;
mod analyzer;
mod criteria;
mod scenarios;
mod weights;

pub use analyzer::DecisionAnalyzer;
pub use criteria::CriteriaOutcome;
pub use scenarios::no_deal_value;
pub use weights::{style_override, CriterionWeights, WeightOverride, WeightPolicy};
