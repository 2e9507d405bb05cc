//! Outcome scenarios and the value of walking away.

use crate::config::ScenarioProbabilities;
use crate::types::{CriterionScores, NegotiationContext, Scenario, ScenarioAnalysis, ScenarioKind};

/// Value of the best alternative to a negotiated agreement.
///
/// Grows with the number of live alternatives, saturating at four.
pub fn no_deal_value(ctx: &NegotiationContext) -> f64 {
    0.2 + 0.05 * ctx.competitive_alternatives.min(4) as f64
}

/// Best, expected, worst and no-deal outcomes of accepting.
///
/// The worst case degrades further when the proposal is risky, so two
/// proposals with the same overall score can differ in expected value.
pub fn analyze(
    overall: f64,
    scores: &CriterionScores,
    ctx: &NegotiationContext,
    probabilities: &ScenarioProbabilities,
) -> ScenarioAnalysis {
    let p = probabilities.normalized();
    let riskiness = 1.0 - scores.risk;

    let scenarios = vec![
        Scenario {
            kind: ScenarioKind::BestCase,
            probability: p.best_case,
            value: (overall + 0.2).min(1.0),
        },
        Scenario {
            kind: ScenarioKind::ExpectedCase,
            probability: p.expected_case,
            value: overall,
        },
        Scenario {
            kind: ScenarioKind::WorstCase,
            probability: p.worst_case,
            value: (overall - 0.2 - 0.2 * riskiness).max(0.0),
        },
        Scenario {
            kind: ScenarioKind::NoDeal,
            probability: p.no_deal,
            value: no_deal_value(ctx),
        },
    ];

    let expected_value = scenarios.iter().map(|s| s.probability * s.value).sum();

    ScenarioAnalysis {
        scenarios,
        expected_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile::Side;

    fn scores(risk: f64) -> CriterionScores {
        CriterionScores {
            needs_satisfaction: 0.7,
            cost_efficiency: 0.7,
            risk,
            strategic_alignment: 0.7,
            timing: 0.7,
            relationship: 0.5,
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let ctx = NegotiationContext::first_round(Side::A);
        let analysis = analyze(0.6, &scores(0.5), &ctx, &ScenarioProbabilities::default());
        let total: f64 = analysis.scenarios.iter().map(|s| s.probability).sum();
        assert_eq!(analysis.scenarios.len(), 4);
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_values_stay_in_unit_range() {
        let ctx = NegotiationContext::first_round(Side::A).with_alternatives(10);
        for overall in [0.0, 0.1, 0.95, 1.0] {
            let analysis = analyze(overall, &scores(0.0), &ctx, &ScenarioProbabilities::default());
            assert!(analysis.scenarios.iter().all(|s| (0.0..=1.0).contains(&s.value)));
        }
    }

    #[test]
    fn test_risk_lowers_expected_value() {
        let ctx = NegotiationContext::first_round(Side::A);
        let safe = analyze(0.7, &scores(0.9), &ctx, &ScenarioProbabilities::default());
        let risky = analyze(0.7, &scores(0.1), &ctx, &ScenarioProbabilities::default());
        assert!(safe.expected_value > risky.expected_value);
    }

    #[test]
    fn test_no_deal_value_grows_with_alternatives() {
        let none = NegotiationContext::first_round(Side::B);
        let many = NegotiationContext::first_round(Side::B).with_alternatives(7);
        assert!((no_deal_value(&none) - 0.2).abs() < 1e-9);
        assert!((no_deal_value(&many) - 0.4).abs() < 1e-9);
    }
}
