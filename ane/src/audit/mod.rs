//! Quality auditor - offline detection of forced matches and bias.
//!
//! The auditor replays the engine's matching over a population: for each
//! sampled actor it ranks every other actor, takes the top candidates,
//! drafts opening terms and runs one decision evaluation. Each match is
//! classified as genuine or forced, and the full set is handed to the
//! [`BiasDetector`]s.
//!
//! Evaluations run on the blocking pool with bounded concurrency. Results
//! keep the sampling order, so a seeded population always produces the
//! same report.

mod bias;
mod forced;
mod population;
mod report;

pub use bias::{
    default_detectors, BiasDetector, ExecutiveWeightDetector, IndustryDominanceDetector,
    LowQualityDetector, SkillOverlapOnlyDetector,
};
pub use forced::{classify_match, ForcedReason};
pub use population::PopulationGenerator;
pub use report::{AuditFinding, AuditReport, FindingKind, MatchRecord, Recommendation};

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use profile::{Actor, Side};

use crate::config::{AneConfig, AuditorConfig, FindingSeverity};
use crate::decision::DecisionAnalyzer;
use crate::proposal::opening_terms;
use crate::scoring::CompatibilityScorer;
use crate::similarity::{TextMatcher, TokenOverlapMatcher};
use crate::types::{NegotiationContext, Result};

/// Runs quality audits over actor populations.
pub struct QualityAuditor {
    evaluator: PairEvaluator,
    detectors: Vec<Box<dyn BiasDetector>>,
}

impl QualityAuditor {
    /// Create an auditor with default configuration.
    pub fn new() -> Self {
        Self::from_config(&AneConfig::default())
    }

    /// Create an auditor from engine configuration.
    pub fn from_config(config: &AneConfig) -> Self {
        let matcher: Arc<dyn TextMatcher> = Arc::new(TokenOverlapMatcher::new());
        Self {
            evaluator: PairEvaluator {
                scorer: CompatibilityScorer::with_config(config.scorer.clone())
                    .with_matcher(matcher.clone()),
                analyzer: DecisionAnalyzer::with_config(config.analyzer.clone())
                    .with_matcher(matcher.clone()),
                matcher,
                config: config.auditor.clone(),
            },
            detectors: default_detectors(&config.auditor),
        }
    }

    /// Use a different text similarity strategy throughout.
    pub fn with_matcher(mut self, matcher: Arc<dyn TextMatcher>) -> Self {
        let evaluator = self.evaluator;
        self.evaluator = PairEvaluator {
            scorer: evaluator.scorer.with_matcher(matcher.clone()),
            analyzer: evaluator.analyzer.with_matcher(matcher.clone()),
            matcher,
            config: evaluator.config,
        };
        self
    }

    /// Add a bias detector.
    pub fn with_detector(mut self, detector: Box<dyn BiasDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Get configuration.
    pub fn config(&self) -> &AuditorConfig {
        &self.evaluator.config
    }

    /// Audit a synthetic population generated from the configured seed.
    pub async fn run_synthetic(&self, size: usize) -> AuditReport {
        let population = PopulationGenerator::new(self.evaluator.config.seed).generate(size);
        self.run(&population).await
    }

    /// Audit `population`.
    pub async fn run(&self, population: &[Actor]) -> AuditReport {
        let config = &self.evaluator.config;
        let sampled = config
            .sample_size
            .unwrap_or(population.len())
            .min(population.len());
        let concurrency = config.concurrency.max(1);

        info!(
            population = population.len(),
            sampled,
            candidates_per_actor = config.candidates_per_actor,
            concurrency,
            "Starting quality audit"
        );

        let population: Arc<Vec<Actor>> = Arc::new(population.to_vec());
        let results: Vec<ActorAudit> = stream::iter(0..sampled)
            .map(|index| {
                let evaluator = self.evaluator.clone();
                let population = Arc::clone(&population);
                async move {
                    let actor_id = population[index].id.clone();
                    match tokio::task::spawn_blocking(move || {
                        evaluator.evaluate_actor(&population, index)
                    })
                    .await
                    {
                        Ok(audit) => audit,
                        Err(err) => {
                            warn!(actor = %actor_id, error = %err, "Audit task failed");
                            ActorAudit {
                                matches: Vec::new(),
                                errors: vec![system_error(format!(
                                    "Evaluation task for actor {} failed: {}",
                                    actor_id, err
                                ))],
                            }
                        }
                    }
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut matches = Vec::new();
        let mut findings = Vec::new();
        for audit in results {
            matches.extend(audit.matches);
            findings.extend(audit.errors);
        }

        for detector in &self.detectors {
            if let Some(finding) = detector.analyze(&matches) {
                warn!(
                    detector = detector.name(),
                    ratio = finding.ratio.unwrap_or_default(),
                    severity = finding.severity.as_str(),
                    "Bias signal detected"
                );
                findings.push(finding);
            }
        }

        let report = AuditReport::new(population.len(), sampled, matches, findings);
        info!(
            total_matches = report.total_matches,
            forced = report.forced_count,
            findings = report.findings.len(),
            "Quality audit complete"
        );
        report
    }
}

impl Default for QualityAuditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches and failures of one sampled actor.
struct ActorAudit {
    matches: Vec<MatchRecord>,
    errors: Vec<AuditFinding>,
}

/// Everything one blocking evaluation task needs.
#[derive(Clone)]
struct PairEvaluator {
    scorer: CompatibilityScorer,
    analyzer: DecisionAnalyzer,
    matcher: Arc<dyn TextMatcher>,
    config: AuditorConfig,
}

impl PairEvaluator {
    fn evaluate_actor(&self, population: &[Actor], index: usize) -> ActorAudit {
        let actor = &population[index];
        let mut audit = ActorAudit {
            matches: Vec::new(),
            errors: Vec::new(),
        };

        let ranked = self.scorer.rank_candidates(actor, population, 0.0);
        for score in ranked.into_iter().take(self.config.candidates_per_actor) {
            let Some(candidate) = population.iter().find(|c| c.id == score.to) else {
                continue;
            };
            match self.evaluate_match(actor, candidate) {
                Ok(record) => audit.matches.push(record),
                Err(err) => {
                    warn!(actor = %actor.id, candidate = %candidate.id, error = %err, "Match evaluation failed");
                    audit.errors.push(system_error(format!(
                        "Could not evaluate {} with {}: {}",
                        actor.id, candidate.id, err
                    )));
                }
            }
        }
        audit
    }

    fn evaluate_match(&self, actor: &Actor, candidate: &Actor) -> Result<MatchRecord> {
        let terms = opening_terms(actor, candidate, self.matcher.as_ref());
        let analysis = self.analyzer.evaluate(
            actor,
            candidate,
            &terms,
            &NegotiationContext::first_round(Side::A),
        )?;
        let pair = self.scorer.score_pair(actor, candidate);
        let forced = classify_match(
            pair.forward.score,
            analysis.overall,
            &pair.forward.reasons,
            &self.config,
        );

        if let Some(reason) = forced {
            debug!(
                actor = %actor.id,
                candidate = %candidate.id,
                compatibility = pair.forward.score,
                overall = analysis.overall,
                reason = ?reason,
                "Forced connection"
            );
        }

        Ok(MatchRecord {
            actor: actor.id.clone(),
            candidate: candidate.id.clone(),
            candidate_industry: candidate.industry.clone(),
            candidate_title: candidate.title.clone(),
            compatibility: pair.forward.score,
            reverse_compatibility: pair.reverse.score,
            asymmetric: pair.asymmetric,
            overall: analysis.overall,
            recommendation: analysis.recommendation,
            reasons: pair.forward.reasons.iter().map(|r| r.kind).collect(),
            forced,
        })
    }
}

fn system_error(description: String) -> AuditFinding {
    AuditFinding {
        kind: FindingKind::SystemError,
        severity: FindingSeverity::Critical,
        description,
        ratio: None,
        threshold: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BiasRule;
    use profile::{NegotiationProfile, Need, Offering, Priority, Urgency};

    #[tokio::test]
    async fn test_synthetic_audit_covers_sample() {
        let mut config = AneConfig::default();
        config.auditor.sample_size = Some(10);
        let auditor = QualityAuditor::from_config(&config);

        let report = auditor.run_synthetic(30).await;
        assert_eq!(report.population_size, 30);
        assert_eq!(report.sampled_actors, 10);
        assert_eq!(report.total_matches, 30);
        assert!(report.findings_of(FindingKind::SystemError).next().is_none());
        assert!(report.matches.iter().all(|m| m.actor != m.candidate));
        assert_eq!(report.matches[0].actor.as_str(), "actor-0000");
    }

    #[tokio::test]
    async fn test_audit_is_deterministic() {
        let auditor = QualityAuditor::new();
        let population = PopulationGenerator::new(9).generate(25);

        let first = auditor.run(&population).await;
        let second = auditor.run(&population).await;
        assert_eq!(first.matches, second.matches);
        assert_eq!(first.findings, second.findings);
    }

    #[tokio::test]
    async fn test_actors_without_offerings_are_scored() {
        let need = Need::new("capital", "seed funding", Priority::High, Urgency::Weeks);
        let population = vec![
            Actor::new("a", "A", "retail").with_need(need.clone()),
            Actor::new("b", "B", "retail").with_need(need),
        ];

        let report = QualityAuditor::new().run(&population).await;
        assert_eq!(report.total_matches, 2);
        assert!(report.findings_of(FindingKind::SystemError).next().is_none());
        assert!(report.matches.iter().all(|m| (0.0..=0.5).contains(&m.overall)));
    }

    #[tokio::test]
    async fn test_evaluation_failure_is_system_error() {
        let broken = NegotiationProfile {
            risk_tolerance: 2.0,
            ..Default::default()
        };
        let population = vec![
            Actor::new("a", "A", "retail")
                .with_offering(Offering::new("design", "product design"))
                .with_negotiation(broken.clone()),
            Actor::new("b", "B", "retail")
                .with_offering(Offering::new("marketing", "brand strategy"))
                .with_negotiation(broken),
        ];

        let report = QualityAuditor::new().run(&population).await;
        assert_eq!(report.total_matches, 0);
        let errors: Vec<_> = report.findings_of(FindingKind::SystemError).collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].severity, FindingSeverity::Critical);
        assert_eq!(report.recommendations[0].priority, FindingSeverity::Critical);
    }

    #[tokio::test]
    async fn test_empty_population() {
        let report = QualityAuditor::new().run(&[]).await;
        assert_eq!(report.total_matches, 0);
        assert_eq!(report.forced_percentage, 0.0);
        assert!(report.findings.is_empty());
    }

    #[tokio::test]
    async fn test_custom_detector_runs() {
        let rule = BiasRule {
            threshold: 0.0,
            severity: FindingSeverity::Low,
        };
        let auditor =
            QualityAuditor::new().with_detector(Box::new(LowQualityDetector::new(rule, 1.01)));
        let population = vec![
            Actor::new("a", "A", "retail")
                .with_offering(Offering::new("design", "product design")),
            Actor::new("b", "B", "media")
                .with_offering(Offering::new("marketing", "brand strategy")),
        ];

        let report = auditor.run(&population).await;
        assert_eq!(report.total_matches, 2);
        assert!(report
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::LowQuality && f.severity == FindingSeverity::Low));
    }
}
