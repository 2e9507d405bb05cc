//! Counter-offer generation.
//!
//! A counter-offer is the proposal adjusted by three independent rules
//! driven by the actor's own analysis of it:
//!
//! 1. Weak needs coverage: ask for unmet critical needs and offer one
//!    high-capacity offering in return
//! 2. Poor cost efficiency: stop giving the last item of a long give list
//! 3. High risk: attach mitigation conditions
//!
//! Rules read the original proposal, so their order never changes which
//! items they touch.

use std::sync::Arc;
use tracing::debug;

use profile::{Actor, Side, Terms};

use crate::config::CounterConfig;
use crate::similarity::{TextMatcher, TokenOverlapMatcher};
use crate::types::DecisionAnalysis;

/// Produces counter-proposals from an actor's analysis.
#[derive(Clone)]
pub struct CounterOfferGenerator {
    config: CounterConfig,
    matcher: Arc<dyn TextMatcher>,
}

impl CounterOfferGenerator {
    /// Create a generator with default configuration.
    pub fn new() -> Self {
        Self::with_config(CounterConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: CounterConfig) -> Self {
        Self {
            config,
            matcher: Arc::new(TokenOverlapMatcher::new()),
        }
    }

    /// Use a different text similarity strategy.
    pub fn with_matcher(mut self, matcher: Arc<dyn TextMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Counter `terms` on behalf of `actor`, who sits on `side`.
    ///
    /// Returns an equal copy of `terms` when no rule applies.
    pub fn counter_offer(
        &self,
        actor: &Actor,
        terms: &Terms,
        side: Side,
        analysis: &DecisionAnalysis,
    ) -> Terms {
        let scores = &analysis.scores;
        let mut countered = terms.clone();
        let mut changes: Vec<&str> = Vec::new();

        if scores.needs_satisfaction < self.config.needs_threshold {
            let received = terms.receives(side);
            let unmet: Vec<&str> = actor
                .critical_needs()
                .filter(|n| {
                    self.matcher.best_match(&n.description, received) == 0.0
                        && self.matcher.best_match(&n.category, received) == 0.0
                })
                .map(|n| n.description.as_str())
                .collect();

            if !unmet.is_empty() {
                for need in &unmet {
                    countered = countered.with_receive(side, *need);
                }

                let given = terms.gives(side);
                let balancing = actor.offerings.iter().find(|o| {
                    o.capacity.level() > self.config.min_balancing_capacity
                        && self.matcher.best_match(&o.description, given) == 0.0
                });
                if let Some(offering) = balancing {
                    countered = countered.with_give(side, offering.description.clone());
                }
                changes.push("requests unmet critical needs");
            }
        }

        let original_gives = terms.gives(side).len();
        if scores.cost_efficiency < self.config.cost_threshold && original_gives > 2 {
            countered = countered.without_give(side, original_gives - 1);
            changes.push("reduces commitments");
        }

        if scores.risk < self.config.risk_threshold {
            let before = countered.conditions.len();
            for condition in &self.config.mitigation_conditions {
                if !countered.conditions.contains(condition) {
                    countered = countered.with_condition(condition.clone());
                }
            }
            if countered.conditions.len() > before {
                changes.push("adds risk mitigation");
            }
        }

        if changes.is_empty() {
            return terms.clone();
        }

        debug!(
            actor = %actor.id,
            side = side.as_str(),
            changes = ?changes,
            "Counter-offer generated"
        );

        countered.with_rationale(format!("Counter-proposal from {}: {}", actor.name, changes.join(", ")))
    }
}

impl Default for CounterOfferGenerator {
    fn default() -> Self {
        Self::new()
    }
}
