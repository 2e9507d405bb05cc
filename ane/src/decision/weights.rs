//! Criterion weights and their style-dependent overrides.

use serde::{Deserialize, Serialize};

use profile::{NegotiationProfile, NegotiationStyle};

use crate::types::CriterionScores;

/// Relative importance of the six decision criteria.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeights {
    /// Needs satisfaction
    pub needs: f64,
    /// Cost efficiency
    pub cost: f64,
    /// Risk level
    pub risk: f64,
    /// Strategic alignment
    pub strategy: f64,
    /// Timing optimality
    pub timing: f64,
    /// Relationship value
    pub relationship: f64,
}

impl Default for CriterionWeights {
    fn default() -> Self {
        Self {
            needs: 0.30,
            cost: 0.20,
            risk: 0.15,
            strategy: 0.15,
            timing: 0.10,
            relationship: 0.10,
        }
    }
}

impl CriterionWeights {
    /// Weights in canonical criterion order.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.needs,
            self.cost,
            self.risk,
            self.strategy,
            self.timing,
            self.relationship,
        ]
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Scale the weights so they sum to 1.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 || !total.is_finite() {
            return Self::default();
        }
        Self {
            needs: self.needs / total,
            cost: self.cost / total,
            risk: self.risk / total,
            strategy: self.strategy / total,
            timing: self.timing / total,
            relationship: self.relationship / total,
        }
    }

    /// Weighted sum of the scores.
    pub fn apply(&self, scores: &CriterionScores) -> f64 {
        self.as_array()
            .iter()
            .zip(scores.as_array().iter())
            .map(|(w, s)| w * s)
            .sum()
    }

    fn scaled(&self, o: &WeightOverride) -> Self {
        Self {
            needs: self.needs * o.needs,
            cost: self.cost * o.cost,
            risk: self.risk * o.risk,
            strategy: self.strategy * o.strategy,
            timing: self.timing * o.timing,
            relationship: self.relationship * o.relationship,
        }
    }
}

/// Multipliers a negotiation style applies on top of the base weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightOverride {
    pub needs: f64,
    pub cost: f64,
    pub risk: f64,
    pub strategy: f64,
    pub timing: f64,
    pub relationship: f64,
}

const COMPETITIVE: WeightOverride = WeightOverride {
    needs: 1.2,
    cost: 1.25,
    risk: 1.0,
    strategy: 0.7,
    timing: 1.0,
    relationship: 0.5,
};

const COLLABORATIVE: WeightOverride = WeightOverride {
    needs: 0.85,
    cost: 0.75,
    risk: 1.0,
    strategy: 1.35,
    timing: 1.0,
    relationship: 1.5,
};

const ACCOMMODATING: WeightOverride = WeightOverride {
    needs: 0.85,
    cost: 0.75,
    risk: 0.7,
    strategy: 1.0,
    timing: 1.0,
    relationship: 2.5,
};

/// Override table entry for a style. `Balanced` keeps the base weights.
pub fn style_override(style: NegotiationStyle) -> Option<WeightOverride> {
    match style {
        NegotiationStyle::Balanced => None,
        NegotiationStyle::Competitive => Some(COMPETITIVE),
        NegotiationStyle::Collaborative => Some(COLLABORATIVE),
        NegotiationStyle::Accommodating => Some(ACCOMMODATING),
    }
}

/// Policy for turning base weights into an actor's effective weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPolicy {
    /// Risk tolerance below which risk counts for more
    pub low_risk_tolerance: f64,
    /// Multiplier applied to the risk weight of risk-averse actors
    pub risk_averse_multiplier: f64,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            low_risk_tolerance: 0.5,
            risk_averse_multiplier: 1.5,
        }
    }
}

impl WeightPolicy {
    /// Effective weights for an actor. Always sums to 1.
    pub fn resolve(&self, base: &CriterionWeights, profile: &NegotiationProfile) -> CriterionWeights {
        let mut weights = match style_override(profile.style) {
            Some(o) => base.scaled(&o),
            None => *base,
        };

        if profile.risk_tolerance < self.low_risk_tolerance {
            weights.risk *= self.risk_averse_multiplier;
        }

        weights.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(style: NegotiationStyle, risk_tolerance: f64) -> NegotiationProfile {
        NegotiationProfile {
            style,
            risk_tolerance,
            min_acceptable_score: 0.6,
        }
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((CriterionWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_balanced_keeps_base_weights() {
        let policy = WeightPolicy::default();
        let weights = policy.resolve(&CriterionWeights::default(), &profile(NegotiationStyle::Balanced, 0.7));
        assert!((weights.needs - 0.30).abs() < 1e-9);
        assert!((weights.relationship - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_risk_averse_actor_weights_risk_higher() {
        let policy = WeightPolicy::default();
        let base = CriterionWeights::default();
        let tolerant = policy.resolve(&base, &profile(NegotiationStyle::Balanced, 0.8));
        let averse = policy.resolve(&base, &profile(NegotiationStyle::Balanced, 0.2));

        assert!(averse.risk > tolerant.risk);
        assert!((averse.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_styles_shift_emphasis() {
        let policy = WeightPolicy::default();
        let base = CriterionWeights::default();
        let competitive = policy.resolve(&base, &profile(NegotiationStyle::Competitive, 0.5));
        let accommodating = policy.resolve(&base, &profile(NegotiationStyle::Accommodating, 0.5));

        assert!(competitive.cost > accommodating.cost);
        assert!(accommodating.relationship > competitive.relationship);
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_default() {
        let zero = CriterionWeights {
            needs: 0.0,
            cost: 0.0,
            risk: 0.0,
            strategy: 0.0,
            timing: 0.0,
            relationship: 0.0,
        };
        assert_eq!(zero.normalized(), CriterionWeights::default());
    }
}
