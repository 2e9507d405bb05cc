//! The six decision criteria.
//!
//! Each criterion is scored independently into [0, 1] where higher is
//! better. Missing optional proposal fields are scored as penalties; none
//! of the functions here can fail.

use profile::{Actor, Constraints, Preferences, Terms};

use crate::config::AnalyzerConfig;
use crate::similarity::TextMatcher;
use crate::types::{CriterionScores, NegotiationContext};

const FAST_TIMELINE_WORDS: &[&str] = &["immediate", "asap", "urgent", "week", "days", "now"];

/// Scores plus the notes gathered while computing them.
#[derive(Debug, Clone)]
pub struct CriteriaOutcome {
    pub scores: CriterionScores,
    pub concerns: Vec<String>,
    pub strengths: Vec<String>,
}

/// Evaluates one actor's view of one proposal.
pub(crate) struct CriteriaEvaluator<'a> {
    pub actor: &'a Actor,
    pub counterpart: &'a Actor,
    pub preferences: &'a Preferences,
    pub constraints: &'a Constraints,
    pub terms: &'a Terms,
    pub ctx: &'a NegotiationContext,
    pub matcher: &'a dyn TextMatcher,
    pub config: &'a AnalyzerConfig,
}

impl<'a> CriteriaEvaluator<'a> {
    /// Score all six criteria.
    pub fn evaluate(&self) -> CriteriaOutcome {
        let mut concerns = Vec::new();
        let mut strengths = Vec::new();

        let needs_satisfaction = self.needs_satisfaction(&mut concerns, &mut strengths);
        let cost_efficiency = self.cost_efficiency(needs_satisfaction);
        let risk = self.risk(&mut concerns);
        let strategic_alignment = self.strategic_alignment(&mut concerns, &mut strengths);
        let timing = self.timing(&mut concerns);
        let relationship = self.relationship();

        let scores = CriterionScores {
            needs_satisfaction,
            cost_efficiency,
            risk,
            strategic_alignment,
            timing,
            relationship,
        };

        for (name, score) in [
            ("cost efficiency", cost_efficiency),
            ("risk profile", risk),
            ("strategic alignment", strategic_alignment),
            ("timing", timing),
            ("relationship value", relationship),
        ] {
            if score >= 0.8 {
                strengths.push(format!("Strong {}", name));
            }
        }

        CriteriaOutcome {
            scores,
            concerns,
            strengths,
        }
    }

    fn received(&self) -> &'a [String] {
        self.terms.receives(self.ctx.side)
    }

    fn given(&self) -> &'a [String] {
        self.terms.gives(self.ctx.side)
    }

    /// Priority-weighted share of needs met by received items.
    fn needs_satisfaction(&self, concerns: &mut Vec<String>, strengths: &mut Vec<String>) -> f64 {
        if self.actor.needs.is_empty() {
            return self.config.no_needs_score;
        }

        let received = self.received();
        let mut total_weight: f64 = 0.0;
        let mut satisfied: f64 = 0.0;

        for need in &self.actor.needs {
            let weight = need.priority.weight();
            total_weight += weight;

            let similarity = self
                .matcher
                .best_match(&need.description, received)
                .max(self.matcher.best_match(&need.category, received));

            if similarity > 0.0 {
                let quality = 0.5 + 0.5 * similarity;
                satisfied += weight * quality;
                if quality >= 0.875 {
                    strengths.push(format!("Need addressed: {}", need.description));
                }
            } else if need.priority == profile::Priority::Critical {
                concerns.push(format!("Critical need not addressed: {}", need.description));
            }
        }

        (satisfied / total_weight).clamp(0.0, 1.0)
    }

    /// Value received relative to the estimated cost of what is given.
    fn cost_efficiency(&self, value_received: f64) -> f64 {
        let total_cost: f64 = self
            .given()
            .iter()
            .map(|item| {
                self.actor
                    .offerings
                    .iter()
                    .map(|o| (self.matcher.similarity(item, &o.description), o.capacity))
                    .filter(|(sim, _)| *sim > 0.0)
                    .max_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(_, capacity)| capacity.give_cost())
                    .unwrap_or(self.config.unmatched_give_cost)
            })
            .sum();

        (value_received / total_cost.max(0.1)).clamp(0.0, 1.0)
    }

    /// Inverted accumulated risk.
    fn risk(&self, concerns: &mut Vec<String>) -> f64 {
        let given = self.given();
        let mut risk = (0.1 * given.len() as f64).min(0.3);

        if self.terms.timeline.is_none() {
            risk += 0.1;
            concerns.push("No timeline specified".to_string());
        }
        if self.terms.success_metrics.is_empty() {
            risk += 0.15;
            concerns.push("No success metrics defined".to_string());
        }
        if self.terms.conditions.is_empty() {
            risk += 0.1;
        }
        if self.ctx.prior_agreements == 0 {
            risk += 0.2;
        }

        for breaker in &self.preferences.deal_breakers {
            if given.iter().any(|g| self.matcher.matches(breaker, g)) {
                risk += 0.4;
                concerns.push(format!("Deal-breaker term included: {}", breaker));
            }
        }

        let violations = self.constraint_violations();
        if !violations.is_empty() {
            risk += 0.3;
            concerns.extend(violations);
        }

        1.0 - risk.min(1.0)
    }

    /// Hard constraints the proposal breaks, as concern texts.
    fn constraint_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let constraints = self.constraints;

        if let (Some(budget), Some(amount)) =
            (constraints.max_budget, self.terms.payment_from(self.ctx.side))
        {
            if amount > budget {
                violations.push(format!(
                    "Constraint violated: payment of {:.2} exceeds budget of {:.2}",
                    amount, budget
                ));
            }
        }

        if let (Some(max_days), Some(days)) = (
            constraints.max_duration_days,
            self.terms.timeline.as_ref().and_then(|t| t.duration_days),
        ) {
            if days > max_days {
                violations.push(format!(
                    "Constraint violated: {} day timeline exceeds limit of {} days",
                    days, max_days
                ));
            }
        }

        if let Some(location) = &self.terms.location {
            if !constraints.regions.is_empty()
                && !constraints
                    .regions
                    .iter()
                    .any(|r| r.trim().eq_ignore_ascii_case(location.trim()))
            {
                violations.push(format!(
                    "Constraint violated: location {} is outside allowed regions",
                    location
                ));
            }
        }

        violations
    }

    /// Progress toward goals, plus preference notes.
    fn strategic_alignment(&self, concerns: &mut Vec<String>, strengths: &mut Vec<String>) -> f64 {
        let received = self.received();
        let mut score: f64 = 0.5;

        for goal in &self.actor.goals {
            let advanced = goal
                .success_criteria
                .iter()
                .any(|c| received.iter().any(|r| self.matcher.matches(c, r)));
            if advanced {
                score += 0.3 * goal.horizon.urgency_weight();
                strengths.push(format!("Advances goal: {}", goal.description));
            }
        }

        for must_have in &self.preferences.must_haves {
            if !received.iter().any(|r| self.matcher.matches(must_have, r)) {
                concerns.push(format!("Must-have missing: {}", must_have));
            }
        }

        if self
            .preferences
            .preferred_categories
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(self.counterpart.industry.trim()))
        {
            strengths.push(format!(
                "Counterpart operates in preferred category {}",
                self.counterpart.industry
            ));
        }

        score.min(1.0)
    }

    /// Fit of the timeline with urgent needs and deadline pressure.
    fn timing(&self, concerns: &mut Vec<String>) -> f64 {
        let mut score: f64 = 0.7;

        let has_urgent_needs = self.actor.needs.iter().any(|n| n.urgency.is_urgent());
        if has_urgent_needs {
            if self.timeline_is_fast() {
                score += 0.2;
            } else {
                score -= 0.2;
                concerns.push("Timeline does not address urgent needs".to_string());
            }
        }

        if self.ctx.deadline_ratio.map_or(false, |r| r > 0.7) {
            score += 0.15;
        }
        if self.ctx.competitive_alternatives > 2 {
            score -= 0.1;
        }

        score.clamp(0.0, 1.0)
    }

    fn timeline_is_fast(&self) -> bool {
        match &self.terms.timeline {
            Some(timeline) => {
                let by_duration = timeline
                    .duration_days
                    .map_or(false, |d| d <= self.config.fast_timeline_days);
                let text = timeline.description.to_lowercase();
                by_duration || FAST_TIMELINE_WORDS.iter().any(|w| text.contains(w))
            }
            None => false,
        }
    }

    fn relationship(&self) -> f64 {
        (0.5 + (0.1 * self.ctx.prior_agreements as f64).min(0.3)).clamp(0.0, 1.0)
    }
}
