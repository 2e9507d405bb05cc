//! Candidate responses to a proposal, ranked by expected value.

use crate::types::{ActionKind, AlternativeAction, CriterionScores, ScenarioAnalysis};

/// Inputs shared by every alternative.
pub(crate) struct AlternativeInputs<'a> {
    pub overall: f64,
    pub scores: &'a CriterionScores,
    pub scenarios: &'a ScenarioAnalysis,
    pub confidence: f64,
    pub no_deal_value: f64,
}

/// Generate the applicable alternatives, best first.
///
/// Accept and reject are always present. The sort is stable, so ties keep
/// generation order and accept wins a tie.
pub(crate) fn generate(inputs: &AlternativeInputs<'_>) -> Vec<AlternativeAction> {
    let overall = inputs.overall;
    let scores = inputs.scores;
    let batna = inputs.no_deal_value;

    let mut alternatives = vec![
        AlternativeAction {
            kind: ActionKind::Accept,
            description: "Accept the proposal as offered".to_string(),
            expected_outcome: "Agreement on the current terms".to_string(),
            success_probability: inputs.confidence,
            expected_value: inputs.scenarios.expected_value,
        },
        AlternativeAction {
            kind: ActionKind::Reject,
            description: "Reject and pursue other options".to_string(),
            expected_outcome: "Fall back to the best alternative".to_string(),
            success_probability: 1.0,
            expected_value: batna,
        },
    ];

    if scores.needs_satisfaction > 0.4 && scores.needs_satisfaction < 0.8 {
        let p = 0.5 + 0.2 * scores.relationship;
        let improved = (overall + 0.5 * (1.0 - scores.needs_satisfaction)).min(1.0);
        alternatives.push(AlternativeAction {
            kind: ActionKind::Counter,
            description: "Counter with terms covering unmet needs".to_string(),
            expected_outcome: "Better needs coverage if the counterpart agrees".to_string(),
            success_probability: p,
            expected_value: p * improved + (1.0 - p) * batna,
        });
    }

    if scores.risk < 0.6 {
        let p = 0.7;
        let clarified = (overall + 0.1).min(1.0);
        alternatives.push(AlternativeAction {
            kind: ActionKind::RequestClarification,
            description: "Ask for timeline, metrics and safeguards".to_string(),
            expected_outcome: "Reduced uncertainty before committing".to_string(),
            success_probability: p,
            expected_value: p * clarified * 0.8 + (1.0 - p) * batna,
        });
    }

    if scores.strategic_alignment < 0.6 && scores.needs_satisfaction > 0.5 {
        let p = 0.4;
        let reshaped = (overall + 0.3 * (1.0 - scores.strategic_alignment)).min(1.0);
        alternatives.push(AlternativeAction {
            kind: ActionKind::ProposeAlternative,
            description: "Propose an exchange that serves long-term goals".to_string(),
            expected_outcome: "Stronger strategic fit if the counterpart engages".to_string(),
            success_probability: p,
            expected_value: p * reshaped + (1.0 - p) * batna,
        });
    }

    alternatives.sort_by(|x, y| {
        y.expected_value
            .partial_cmp(&x.expected_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenarios(expected_value: f64) -> ScenarioAnalysis {
        ScenarioAnalysis {
            scenarios: Vec::new(),
            expected_value,
        }
    }

    fn scores(needs: f64, risk: f64, strategy: f64) -> CriterionScores {
        CriterionScores {
            needs_satisfaction: needs,
            cost_efficiency: 0.8,
            risk,
            strategic_alignment: strategy,
            timing: 0.7,
            relationship: 0.5,
        }
    }

    #[test]
    fn test_accept_and_reject_always_present() {
        let s = scores(0.95, 0.9, 0.9);
        let sc = scenarios(0.8);
        let alts = generate(&AlternativeInputs {
            overall: 0.85,
            scores: &s,
            scenarios: &sc,
            confidence: 0.8,
            no_deal_value: 0.2,
        });
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].kind, ActionKind::Accept);
        assert_eq!(alts[1].kind, ActionKind::Reject);
    }

    #[test]
    fn test_partial_needs_favor_counter() {
        let s = scores(0.5, 0.7, 0.7);
        let sc = scenarios(0.5);
        let alts = generate(&AlternativeInputs {
            overall: 0.55,
            scores: &s,
            scenarios: &sc,
            confidence: 0.5,
            no_deal_value: 0.2,
        });
        assert_eq!(alts[0].kind, ActionKind::Counter);
    }

    #[test]
    fn test_ranked_by_expected_value() {
        let s = scores(0.6, 0.3, 0.4);
        let sc = scenarios(0.45);
        let alts = generate(&AlternativeInputs {
            overall: 0.5,
            scores: &s,
            scenarios: &sc,
            confidence: 0.4,
            no_deal_value: 0.3,
        });
        assert_eq!(alts.len(), 5);
        assert!(alts
            .windows(2)
            .all(|w| w[0].expected_value >= w[1].expected_value));
    }

    #[test]
    fn test_poor_deal_recommends_reject() {
        let s = scores(0.2, 0.8, 0.8);
        let sc = scenarios(0.15);
        let alts = generate(&AlternativeInputs {
            overall: 0.2,
            scores: &s,
            scenarios: &sc,
            confidence: 0.2,
            no_deal_value: 0.3,
        });
        assert_eq!(alts[0].kind, ActionKind::Reject);
    }
}
