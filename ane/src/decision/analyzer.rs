//! Decision analyzer - one actor's multi-criteria view of a proposal.

use std::sync::Arc;
use tracing::debug;

use profile::{Actor, Terms};

use crate::config::AnalyzerConfig;
use crate::similarity::{TextMatcher, TokenOverlapMatcher};
use crate::types::{
    ActionKind, AneError, CriterionScores, DecisionAnalysis, NegotiationContext, Result,
};

use super::alternatives::{self, AlternativeInputs};
use super::criteria::CriteriaEvaluator;
use super::scenarios;

/// Evaluates proposals from the perspective of a single actor.
///
/// Evaluation is synchronous and side-effect free; the same inputs always
/// produce the same analysis.
#[derive(Clone)]
pub struct DecisionAnalyzer {
    config: AnalyzerConfig,
    matcher: Arc<dyn TextMatcher>,
}

impl DecisionAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: AnalyzerConfig) -> Self {
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

    /// Configuration in use.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Evaluate `terms` for `actor`, who sits on `ctx.side` of the terms.
    pub fn evaluate(
        &self,
        actor: &Actor,
        counterpart: &Actor,
        terms: &Terms,
        ctx: &NegotiationContext,
    ) -> Result<DecisionAnalysis> {
        if ctx.round == 0 {
            return Err(AneError::InvalidInput("round must start at 1".to_string()));
        }
        if let Some(ratio) = ctx.deadline_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(AneError::InvalidInput(format!(
                    "deadline ratio must be within 0.0 - 1.0, got {}",
                    ratio
                )));
            }
        }
        let preferences = actor.preferences.as_ref().ok_or_else(|| {
            AneError::InvalidInput(format!("actor {} has no preferences", actor.id))
        })?;
        let constraints = actor.constraints.as_ref().ok_or_else(|| {
            AneError::InvalidInput(format!("actor {} has no constraints", actor.id))
        })?;
        actor.validate()?;

        let outcome = CriteriaEvaluator {
            actor,
            counterpart,
            preferences,
            constraints,
            terms,
            ctx,
            matcher: self.matcher.as_ref(),
            config: &self.config,
        }
        .evaluate();
        let scores = outcome.scores;

        let weights = self
            .config
            .weight_policy
            .resolve(&self.config.weights, &actor.negotiation);
        let overall = weights.apply(&scores).clamp(0.0, 1.0);

        let confidence = self.confidence(overall, &scores, ctx);
        let no_deal_value = scenarios::no_deal_value(ctx);
        let scenario_analysis = scenarios::analyze(overall, &scores, ctx, &self.config.scenarios);

        let alternatives = alternatives::generate(&AlternativeInputs {
            overall,
            scores: &scores,
            scenarios: &scenario_analysis,
            confidence,
            no_deal_value,
        });
        let recommendation = alternatives
            .first()
            .map(|a| a.kind)
            .unwrap_or(ActionKind::Reject);
        let accept =
            recommendation == ActionKind::Accept && overall >= actor.negotiation.min_acceptable_score;

        debug!(
            actor = %actor.id,
            round = ctx.round,
            side = ctx.side.as_str(),
            overall = overall,
            recommendation = recommendation.as_str(),
            accept = accept,
            "Proposal evaluated"
        );

        Ok(DecisionAnalysis {
            actor_id: actor.id.clone(),
            round: ctx.round,
            scores,
            overall,
            accept,
            recommendation,
            confidence,
            concerns: outcome.concerns,
            strengths: outcome.strengths,
            alternatives,
            scenarios: scenario_analysis,
        })
    }

    fn confidence(
        &self,
        overall: f64,
        scores: &CriterionScores,
        ctx: &NegotiationContext,
    ) -> f64 {
        let mut confidence = overall - 2.0 * scores.variance();
        if ctx.deadline_ratio.map_or(false, |r| r > 0.8) {
            confidence -= 0.1;
        }
        if ctx.prior_agreements > 2 {
            confidence += 0.1;
        }
        confidence.clamp(0.1, 0.95)
    }
}

impl Default for DecisionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile::{
        Capacity, Constraints, Goal, Horizon, NegotiationProfile, NegotiationStyle, Need, Offering,
        Preferences, Priority, Side, Timeline, Urgency,
    };

    fn founder() -> Actor {
        Actor::new("founder", "Founder Co", "fintech")
            .with_need(Need::new("capital", "seed funding", Priority::Critical, Urgency::Weeks))
            .with_offering(Offering::new("engineering", "payments integration").with_capacity(Capacity::High))
            .with_goal(Goal::new("Close the round", Horizon::Short).with_criterion("seed funding"))
    }

    fn investor() -> Actor {
        Actor::new("investor", "Angel Fund", "venture")
            .with_offering(Offering::new("capital", "seed funding"))
            .with_need(Need::new("deals", "payments integration", Priority::High, Urgency::Flexible))
    }

    fn good_terms() -> Terms {
        Terms::new(
            vec!["payments integration".to_string()],
            vec!["seed funding".to_string()],
        )
        .with_timeline(Timeline::new("six weeks", Some(42)))
        .with_metric("first close")
        .with_condition("quarterly board update")
    }

    #[test]
    fn test_good_deal_is_accepted() {
        let analyzer = DecisionAnalyzer::new();
        let ctx = NegotiationContext::first_round(Side::A);
        let analysis = analyzer.evaluate(&founder(), &investor(), &good_terms(), &ctx).unwrap();

        assert_eq!(analysis.scores.needs_satisfaction, 1.0);
        assert!((analysis.scores.risk - 0.7).abs() < 1e-9);
        assert!((analysis.overall - 0.845).abs() < 1e-9);
        assert_eq!(analysis.recommendation, ActionKind::Accept);
        assert!(analysis.accept);
        assert!(analysis.confidence >= 0.1 && analysis.confidence <= 0.95);
    }

    #[test]
    fn test_unmet_critical_need_is_flagged() {
        let analyzer = DecisionAnalyzer::new();
        let terms = Terms::new(
            vec!["payments integration".to_string()],
            vec!["office space".to_string()],
        );
        let ctx = NegotiationContext::first_round(Side::A);
        let analysis = analyzer.evaluate(&founder(), &investor(), &terms, &ctx).unwrap();

        assert_eq!(analysis.scores.needs_satisfaction, 0.0);
        assert!(analysis
            .concerns
            .iter()
            .any(|c| c == "Critical need not addressed: seed funding"));
        assert!(!analysis.accept);
    }

    #[test]
    fn test_side_selects_view() {
        let analyzer = DecisionAnalyzer::new();
        let ctx = NegotiationContext::first_round(Side::B);
        let analysis = analyzer.evaluate(&investor(), &founder(), &good_terms(), &ctx).unwrap();
        assert_eq!(analysis.actor_id, investor().id);
        assert_eq!(analysis.scores.needs_satisfaction, 1.0);
    }

    #[test]
    fn test_deal_breaker_and_budget_raise_risk() {
        let analyzer = DecisionAnalyzer::new();
        let actor = founder()
            .with_preferences(Preferences {
                deal_breakers: vec!["equity".to_string()],
                ..Default::default()
            })
            .with_constraints(Constraints {
                max_budget: Some(1_000.0),
                ..Default::default()
            });
        let terms = good_terms()
            .with_give(Side::A, "equity stake")
            .with_payment(Side::A, 5_000.0);
        let ctx = NegotiationContext::first_round(Side::A);

        let baseline = analyzer.evaluate(&founder(), &investor(), &good_terms(), &ctx).unwrap();
        let analysis = analyzer.evaluate(&actor, &investor(), &terms, &ctx).unwrap();

        assert!(analysis.scores.risk < baseline.scores.risk);
        assert!(analysis.concerns.iter().any(|c| c.contains("Deal-breaker")));
        assert!(analysis.concerns.iter().any(|c| c.contains("budget")));
    }

    #[test]
    fn test_risk_averse_style_changes_overall() {
        let analyzer = DecisionAnalyzer::new();
        let averse = founder().with_negotiation(NegotiationProfile {
            style: NegotiationStyle::Balanced,
            risk_tolerance: 0.1,
            min_acceptable_score: 0.6,
        });
        let ctx = NegotiationContext::first_round(Side::A);
        let base = analyzer.evaluate(&founder(), &investor(), &good_terms(), &ctx).unwrap();
        let weighted = analyzer.evaluate(&averse, &investor(), &good_terms(), &ctx).unwrap();

        // risk (0.7) sits below the weighted mean of the rest
        assert!(weighted.overall < base.overall);
    }

    #[test]
    fn test_missing_timeline_penalizes_urgent_actor() {
        let analyzer = DecisionAnalyzer::new();
        let urgent = Actor::new("urgent", "Urgent Ltd", "retail")
            .with_need(Need::new("capital", "seed funding", Priority::Critical, Urgency::Immediate));
        let terms = Terms::new(vec!["revenue share".to_string()], vec!["seed funding".to_string()]);
        let ctx = NegotiationContext::first_round(Side::A);
        let analysis = analyzer.evaluate(&urgent, &investor(), &terms, &ctx).unwrap();

        assert!((analysis.scores.timing - 0.5).abs() < 1e-9);
        assert!(analysis.concerns.iter().any(|c| c == "No timeline specified"));
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let analyzer = DecisionAnalyzer::new();
        let mut ctx = NegotiationContext::first_round(Side::A);
        ctx.round = 0;
        assert!(matches!(
            analyzer.evaluate(&founder(), &investor(), &good_terms(), &ctx),
            Err(AneError::InvalidInput(_))
        ));

        let ctx = NegotiationContext::first_round(Side::A);
        let mut sparse = founder();
        sparse.preferences = None;
        assert!(matches!(
            analyzer.evaluate(&sparse, &investor(), &good_terms(), &ctx),
            Err(AneError::InvalidInput(_))
        ));

        let ctx = NegotiationContext::first_round(Side::A).with_deadline_ratio(1.5);
        assert!(analyzer
            .evaluate(&founder(), &investor(), &good_terms(), &ctx)
            .is_err());
    }

    #[test]
    fn test_empty_terms_score_low_instead_of_failing() {
        let analyzer = DecisionAnalyzer::new();
        let ctx = NegotiationContext::first_round(Side::A);
        let analysis = analyzer
            .evaluate(&founder(), &investor(), &Terms::default(), &ctx)
            .unwrap();

        assert_eq!(analysis.scores.needs_satisfaction, 0.0);
        assert_eq!(analysis.scores.cost_efficiency, 0.0);
        assert!(!analysis.accept);
        assert!(analysis
            .concerns
            .iter()
            .any(|c| c == "Critical need not addressed: seed funding"));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let analyzer = DecisionAnalyzer::new();
        let ctx = NegotiationContext::first_round(Side::A).with_alternatives(2);
        let first = analyzer.evaluate(&founder(), &investor(), &good_terms(), &ctx).unwrap();
        let second = analyzer.evaluate(&founder(), &investor(), &good_terms(), &ctx).unwrap();
        assert_eq!(first.overall, second.overall);
        assert_eq!(first.alternatives, second.alternatives);
    }
}
