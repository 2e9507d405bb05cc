//! Compatibility scorer - pairwise affinity between two actors.
//!
//! Scoring is a pure function of the two profiles, so it is safe to run
//! in parallel and always reproducible. Scores are direction-aware: A→B
//! measures how well B serves A. [`CompatibilityScorer::score_pair`]
//! computes both directions and flags large gaps instead of averaging
//! them away.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use profile::{Actor, ActorId};

use crate::config::ScorerConfig;
use crate::similarity::{TextMatcher, TokenOverlapMatcher};

/// Kind of evidence behind a compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    /// Same industry
    IndustryAffinity,
    /// Shared skills
    SkillMatch,
    /// A need of one actor meets an offering of the other
    ComplementaryNeed,
    /// An offering advances one of the actor's goals
    BusinessOpportunity,
}

impl ReasonKind {
    /// Whether the reason reflects substance rather than surface affinity.
    pub fn is_substantive(&self) -> bool {
        !matches!(self, ReasonKind::IndustryAffinity)
    }
}

/// One piece of evidence for a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReason {
    /// Kind of evidence
    pub kind: ReasonKind,
    /// Human-readable detail
    pub detail: String,
}

/// Contribution of each factor to a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityFactors {
    /// Starting score
    pub base: f64,
    /// Industry bonus
    pub industry_affinity: f64,
    /// Skill overlap bonus
    pub skill_overlap: f64,
    /// Need/offering complementarity bonus (before capping)
    pub complementarity: f64,
}

/// Directional compatibility of one actor with another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    /// Actor whose needs are being served
    pub from: ActorId,
    /// Actor doing the serving
    pub to: ActorId,
    /// Score (0.0 - 1.0)
    pub score: f64,
    /// Factor breakdown
    pub factors: CompatibilityFactors,
    /// Evidence
    pub reasons: Vec<MatchReason>,
}

impl CompatibilityScore {
    /// Whether any substantive reason supports the match.
    pub fn has_substantive_reason(&self) -> bool {
        self.reasons.iter().any(|r| r.kind.is_substantive())
    }
}

/// Both directions of a pair's compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCompatibility {
    /// A→B
    pub forward: CompatibilityScore,
    /// B→A
    pub reverse: CompatibilityScore,
    /// Absolute difference between directions
    pub asymmetry: f64,
    /// Whether the difference exceeds the configured threshold
    pub asymmetric: bool,
}

/// Scores compatibility between actor profiles.
#[derive(Clone)]
pub struct CompatibilityScorer {
    /// Configuration
    config: ScorerConfig,
    /// Text similarity strategy
    matcher: Arc<dyn TextMatcher>,
}

impl CompatibilityScorer {
    /// Create a scorer with default configuration.
    pub fn new() -> Self {
        Self::with_config(ScorerConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: ScorerConfig) -> Self {
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

    /// Text similarity strategy in use.
    pub fn matcher(&self) -> Arc<dyn TextMatcher> {
        Arc::clone(&self.matcher)
    }

    /// Score how well `b` serves `a`.
    pub fn score(&self, a: &Actor, b: &Actor) -> CompatibilityScore {
        let mut factors = CompatibilityFactors {
            base: self.config.base_score,
            ..Default::default()
        };
        let mut reasons = Vec::new();

        if !a.industry.trim().is_empty() && a.industry.trim().eq_ignore_ascii_case(b.industry.trim()) {
            factors.industry_affinity = self.config.industry_bonus;
            reasons.push(MatchReason {
                kind: ReasonKind::IndustryAffinity,
                detail: format!("Both operate in {}", a.industry),
            });
        }

        let shared = shared_skills(a, b);
        if !shared.is_empty() {
            factors.skill_overlap =
                self.config.max_skill_bonus * (1.0 - 0.5f64.powi(shared.len() as i32));
            reasons.push(MatchReason {
                kind: ReasonKind::SkillMatch,
                detail: format!("Shared skills: {}", shared.join(", ")),
            });
        }

        for need in &a.needs {
            let offering = b.offerings.iter().find(|o| {
                self.matcher.matches(&need.description, &o.description)
                    || self.matcher.matches(&need.category, &o.category)
            });
            if let Some(offering) = offering {
                factors.complementarity += self.config.complementarity_increment;
                reasons.push(MatchReason {
                    kind: ReasonKind::ComplementaryNeed,
                    detail: format!(
                        "{} needs '{}', {} offers '{}'",
                        a.name, need.description, b.name, offering.description
                    ),
                });
            }
        }

        for goal in &a.goals {
            let advanced = b.offerings.iter().any(|o| {
                goal.success_criteria
                    .iter()
                    .any(|c| self.matcher.matches(c, &o.description))
            });
            if advanced {
                reasons.push(MatchReason {
                    kind: ReasonKind::BusinessOpportunity,
                    detail: format!("{} can advance goal '{}'", b.name, goal.description),
                });
            }
        }

        let raw = factors.base + factors.industry_affinity + factors.skill_overlap + factors.complementarity;
        let score = raw.clamp(0.0, 1.0);

        debug!(
            from = %a.id,
            to = %b.id,
            score = score,
            reasons = reasons.len(),
            "Compatibility scored"
        );

        CompatibilityScore {
            from: a.id.clone(),
            to: b.id.clone(),
            score,
            factors,
            reasons,
        }
    }

    /// Score both directions and flag asymmetric pairs.
    pub fn score_pair(&self, a: &Actor, b: &Actor) -> PairCompatibility {
        let forward = self.score(a, b);
        let reverse = self.score(b, a);
        let asymmetry = (forward.score - reverse.score).abs();
        let asymmetric = asymmetry > self.config.asymmetry_threshold;

        if asymmetric {
            warn!(
                actor_a = %a.id,
                actor_b = %b.id,
                forward = forward.score,
                reverse = reverse.score,
                "Asymmetric compatibility - match may be forced"
            );
        }

        PairCompatibility {
            forward,
            reverse,
            asymmetry,
            asymmetric,
        }
    }

    /// Candidates scoring at least `min_score` for `actor`, best first.
    ///
    /// Ties are broken by actor ID so the ranking is stable.
    pub fn rank_candidates<'a>(
        &self,
        actor: &Actor,
        candidates: impl IntoIterator<Item = &'a Actor>,
        min_score: f64,
    ) -> Vec<CompatibilityScore> {
        let mut ranked: Vec<CompatibilityScore> = candidates
            .into_iter()
            .filter(|c| c.id != actor.id)
            .map(|c| self.score(actor, c))
            .filter(|s| s.score >= min_score)
            .collect();

        ranked.sort_by(|x, y| {
            y.score
                .partial_cmp(&x.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| x.to.cmp(&y.to))
        });
        ranked
    }
}

impl Default for CompatibilityScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn shared_skills(a: &Actor, b: &Actor) -> Vec<String> {
    let theirs: HashSet<String> = b.skills.iter().map(|s| s.trim().to_lowercase()).collect();
    let mut seen = HashSet::new();
    a.skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && theirs.contains(s))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile::{Goal, Horizon, Need, Offering, Priority, Urgency};

    fn founder() -> Actor {
        Actor::new("founder", "Founder Co", "fintech")
            .with_skill("rust")
            .with_skill("payments")
            .with_need(Need::new("capital", "seed funding", Priority::Critical, Urgency::Weeks))
            .with_need(Need::new("legal", "contract review", Priority::Medium, Urgency::Flexible))
            .with_goal(Goal::new("Launch product", Horizon::Short).with_criterion("seed funding closed"))
            .with_offering(Offering::new("engineering", "payments integration"))
    }

    fn investor() -> Actor {
        Actor::new("investor", "Angel Fund", "fintech")
            .with_skill("payments")
            .with_offering(Offering::new("capital", "seed funding"))
            .with_need(Need::new("deals", "early stage deal flow", Priority::High, Urgency::Weeks))
    }

    #[test]
    fn test_score_breakdown() {
        let scorer = CompatibilityScorer::new();
        let score = scorer.score(&founder(), &investor());

        assert_eq!(score.factors.base, 0.3);
        assert_eq!(score.factors.industry_affinity, 0.2);
        assert!((score.factors.skill_overlap - 0.1).abs() < 1e-9);
        assert!((score.factors.complementarity - 0.15).abs() < 1e-9);
        assert!((score.score - 0.75).abs() < 1e-9);
        assert!(score.reasons.iter().any(|r| r.kind == ReasonKind::ComplementaryNeed));
        assert!(score.reasons.iter().any(|r| r.kind == ReasonKind::BusinessOpportunity));
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = CompatibilityScorer::new();
        let first = scorer.score(&founder(), &investor());
        let second = scorer.score(&founder(), &investor());
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_is_capped() {
        let mut a = founder();
        let mut b = investor();
        for i in 0..10 {
            a = a.with_need(Need::new("capital", format!("funding tranche {}", i), Priority::Low, Urgency::Flexible));
            b = b.with_skill(format!("skill-{}", i));
        }
        let score = CompatibilityScorer::new().score(&a, &b);
        assert_eq!(score.score, 1.0);
    }

    #[test]
    fn test_sparse_profiles_get_base_score() {
        let a = Actor::new("a", "A", "");
        let b = Actor::new("b", "B", "");
        let score = CompatibilityScorer::new().score(&a, &b);
        assert_eq!(score.score, 0.3);
        assert!(score.reasons.is_empty());
    }

    #[test]
    fn test_pair_flags_asymmetry() {
        let mut config = ScorerConfig::default();
        config.asymmetry_threshold = 0.1;
        let scorer = CompatibilityScorer::with_config(config);

        let needy = Actor::new("needy", "Needy", "retail")
            .with_need(Need::new("marketing", "brand strategy", Priority::High, Urgency::Days))
            .with_need(Need::new("design", "logo design", Priority::High, Urgency::Days));
        let provider = Actor::new("provider", "Studio", "media")
            .with_offering(Offering::new("marketing", "brand strategy"))
            .with_offering(Offering::new("design", "logo design"));

        let pair = scorer.score_pair(&needy, &provider);
        assert!(pair.forward.score > pair.reverse.score);
        assert!(pair.asymmetric);
        assert!((pair.asymmetry - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_rank_candidates_orders_and_filters() {
        let scorer = CompatibilityScorer::new();
        let a = founder();
        let good = investor();
        let weak = Actor::new("weak", "Weak", "agriculture");
        let candidates = vec![weak.clone(), good.clone(), a.clone()];

        let ranked = scorer.rank_candidates(&a, &candidates, 0.4);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].to, good.id);
    }
}
