//! Configuration for the negotiation engine.
//!
//! Every constant the scoring, decision and audit code relies on is a
//! default here rather than a literal in the algorithm, so deployments can
//! tune thresholds from YAML without touching code.

use serde::{Deserialize, Serialize};

use crate::decision::{CriterionWeights, WeightPolicy};
use crate::types::{AneError, Result};

/// Configuration for an engine instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AneConfig {
    /// Compatibility scorer configuration
    pub scorer: ScorerConfig,
    /// Decision analyzer configuration
    pub analyzer: AnalyzerConfig,
    /// Counter-offer configuration
    pub counter: CounterConfig,
    /// Orchestrator configuration
    pub orchestrator: OrchestratorConfig,
    /// Quality auditor configuration
    pub auditor: AuditorConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl AneConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Check that every section is usable.
    pub fn validate(&self) -> Result<()> {
        self.scorer.validate()?;
        self.analyzer.validate()?;
        self.counter.validate()?;
        self.orchestrator.validate()?;
        self.auditor.validate()?;
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AneError::ConfigError(format!(
            "{} must be within 0.0 - 1.0, got {}",
            name, value
        )))
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AneError::ConfigError(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

/// Compatibility scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Score every pair starts from
    pub base_score: f64,
    /// Bonus when industries match
    pub industry_bonus: f64,
    /// Ceiling of the skill overlap bonus
    pub max_skill_bonus: f64,
    /// Bonus per need of one actor met by an offering of the other
    pub complementarity_increment: f64,
    /// Difference between directions above which a pair is asymmetric
    pub asymmetry_threshold: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            base_score: 0.3,
            industry_bonus: 0.2,
            max_skill_bonus: 0.2,
            complementarity_increment: 0.15,
            asymmetry_threshold: 0.25,
        }
    }
}

impl ScorerConfig {
    fn validate(&self) -> Result<()> {
        check_unit("scorer.base_score", self.base_score)?;
        check_unit("scorer.industry_bonus", self.industry_bonus)?;
        check_unit("scorer.max_skill_bonus", self.max_skill_bonus)?;
        check_unit("scorer.complementarity_increment", self.complementarity_increment)?;
        check_unit("scorer.asymmetry_threshold", self.asymmetry_threshold)
    }
}

/// Scenario probabilities used by decision analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProbabilities {
    pub best_case: f64,
    pub expected_case: f64,
    pub worst_case: f64,
    pub no_deal: f64,
}

impl Default for ScenarioProbabilities {
    fn default() -> Self {
        Self {
            best_case: 0.25,
            expected_case: 0.50,
            worst_case: 0.15,
            no_deal: 0.10,
        }
    }
}

impl ScenarioProbabilities {
    /// Probabilities scaled to sum to 1.
    pub fn normalized(&self) -> Self {
        let total = self.best_case + self.expected_case + self.worst_case + self.no_deal;
        if total <= 0.0 || !total.is_finite() {
            return Self::default();
        }
        Self {
            best_case: self.best_case / total,
            expected_case: self.expected_case / total,
            worst_case: self.worst_case / total,
            no_deal: self.no_deal / total,
        }
    }
}

/// Decision analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Base criterion weights
    pub weights: CriterionWeights,
    /// How style and risk tolerance reshape the weights
    pub weight_policy: WeightPolicy,
    /// Scenario probabilities
    pub scenarios: ScenarioProbabilities,
    /// Cost of a given item that matches none of the actor's offerings
    pub unmatched_give_cost: f64,
    /// Needs satisfaction of an actor that declared no needs
    pub no_needs_score: f64,
    /// Timeline length (days) still considered fast
    pub fast_timeline_days: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            weights: CriterionWeights::default(),
            weight_policy: WeightPolicy::default(),
            scenarios: ScenarioProbabilities::default(),
            unmatched_give_cost: 0.8,
            no_needs_score: 0.3,
            fast_timeline_days: 30,
        }
    }
}

impl AnalyzerConfig {
    fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("needs", self.weights.needs),
            ("cost", self.weights.cost),
            ("risk", self.weights.risk),
            ("strategy", self.weights.strategy),
            ("timing", self.weights.timing),
            ("relationship", self.weights.relationship),
        ] {
            check_positive(&format!("analyzer.weights.{}", name), w)?;
        }
        let s = &self.scenarios;
        for (name, p) in [
            ("best_case", s.best_case),
            ("expected_case", s.expected_case),
            ("worst_case", s.worst_case),
            ("no_deal", s.no_deal),
        ] {
            check_positive(&format!("analyzer.scenarios.{}", name), p)?;
        }
        check_positive(
            "analyzer.weight_policy.risk_averse_multiplier",
            self.weight_policy.risk_averse_multiplier,
        )?;
        check_unit("analyzer.unmatched_give_cost", self.unmatched_give_cost)?;
        check_unit("analyzer.no_needs_score", self.no_needs_score)
    }
}

/// Counter-offer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Needs satisfaction below which unmet critical needs are added
    pub needs_threshold: f64,
    /// Cost efficiency below which a given item is dropped
    pub cost_threshold: f64,
    /// Risk score below which mitigation conditions are added
    pub risk_threshold: f64,
    /// Minimum capacity level of an offering used to rebalance
    pub min_balancing_capacity: f64,
    /// Conditions appended to risky proposals
    pub mitigation_conditions: Vec<String>,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            needs_threshold: 0.7,
            cost_threshold: 0.5,
            risk_threshold: 0.6,
            min_balancing_capacity: 0.4,
            mitigation_conditions: vec![
                "Phased implementation with review milestones".to_string(),
                "Termination clause with 30 days notice".to_string(),
                "Periodic progress reporting".to_string(),
            ],
        }
    }
}

impl CounterConfig {
    fn validate(&self) -> Result<()> {
        check_unit("counter.needs_threshold", self.needs_threshold)?;
        check_unit("counter.cost_threshold", self.cost_threshold)?;
        check_unit("counter.risk_threshold", self.risk_threshold)?;
        check_unit("counter.min_balancing_capacity", self.min_balancing_capacity)
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Minimum forward compatibility to open a negotiation
    pub min_compatibility: f64,
    /// Rounds allowed before a negotiation is rejected
    pub max_rounds: u32,
    /// Time budget when the caller gives no deadline (seconds)
    pub default_deadline_secs: u64,
    /// How long a busy negotiation is waited for before `Conflict` (ms)
    pub lock_timeout_ms: u64,
    /// Parallel round workers (defaults to available cores)
    pub workers: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_compatibility: 0.5,
            max_rounds: 5,
            default_deadline_secs: 3600,
            lock_timeout_ms: 250,
            workers: None,
        }
    }
}

impl OrchestratorConfig {
    fn validate(&self) -> Result<()> {
        check_unit("orchestrator.min_compatibility", self.min_compatibility)?;
        if self.max_rounds == 0 {
            return Err(AneError::ConfigError(
                "orchestrator.max_rounds must be at least 1".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(AneError::ConfigError(
                "orchestrator.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of parallel round workers.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

/// Severity assigned to a bias finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    /// Worth noting
    Low,
    /// Requires attention
    Medium,
    /// Matching quality is compromised
    High,
    /// The audit itself could not run correctly
    Critical,
}

impl FindingSeverity {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Low => "low",
            FindingSeverity::Medium => "medium",
            FindingSeverity::High => "high",
            FindingSeverity::Critical => "critical",
        }
    }
}

/// Threshold and severity of one bias signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasRule {
    /// Ratio above which the signal is reported
    pub threshold: f64,
    /// Severity of the reported finding
    pub severity: FindingSeverity,
}

impl BiasRule {
    fn new(threshold: f64, severity: FindingSeverity) -> Self {
        Self { threshold, severity }
    }
}

/// Quality auditor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    /// Actors sampled from the population (all when unset)
    pub sample_size: Option<usize>,
    /// Candidate matches evaluated per sampled actor
    pub candidates_per_actor: usize,
    /// Concurrent pair evaluations
    pub concurrency: usize,
    /// Seed of the synthetic population generator
    pub seed: u64,
    /// Compatibility below which a high-scoring match is forced
    pub forced_compatibility: f64,
    /// Overall score above which a low-compatibility match is forced
    pub forced_overall: f64,
    /// Overall score above which an unreasoned match is forced
    pub unreasoned_overall: f64,
    /// Industry dominance signal
    pub industry_dominance: BiasRule,
    /// Executive/title weight signal
    pub executive_weight: BiasRule,
    /// Skill-overlap-only signal
    pub skill_overlap_only: BiasRule,
    /// Low-quality match signal
    pub low_quality: BiasRule,
    /// Compatibility below which a match counts as low quality
    pub low_quality_compatibility: f64,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            sample_size: None,
            candidates_per_actor: 3,
            concurrency: 8,
            seed: 42,
            forced_compatibility: 0.5,
            forced_overall: 0.7,
            unreasoned_overall: 0.6,
            industry_dominance: BiasRule::new(0.6, FindingSeverity::High),
            executive_weight: BiasRule::new(0.4, FindingSeverity::Medium),
            skill_overlap_only: BiasRule::new(0.3, FindingSeverity::Medium),
            low_quality: BiasRule::new(0.3, FindingSeverity::High),
            low_quality_compatibility: 0.5,
        }
    }
}

impl AuditorConfig {
    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AneError::ConfigError(
                "auditor.concurrency must be at least 1".to_string(),
            ));
        }
        check_unit("auditor.forced_compatibility", self.forced_compatibility)?;
        check_unit("auditor.forced_overall", self.forced_overall)?;
        check_unit("auditor.unreasoned_overall", self.unreasoned_overall)?;
        check_unit("auditor.industry_dominance", self.industry_dominance.threshold)?;
        check_unit("auditor.executive_weight", self.executive_weight.threshold)?;
        check_unit("auditor.skill_overlap_only", self.skill_overlap_only.threshold)?;
        check_unit("auditor.low_quality", self.low_quality.threshold)?;
        check_unit("auditor.low_quality_compatibility", self.low_quality_compatibility)
    }
}

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Engine instance ID used in logs
    pub engine_id: String,
    /// Log level
    pub log_level: String,
    /// Maximum events retained by the in-memory ledger
    pub ledger_capacity: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            engine_id: "ane".to_string(),
            log_level: "info".to_string(),
            ledger_capacity: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AneConfig::default();
        assert_eq!(config.orchestrator.max_rounds, 5);
        assert_eq!(config.auditor.industry_dominance.threshold, 0.6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = AneConfig::default();
        config.orchestrator.max_rounds = 8;
        let yaml = config.to_yaml().unwrap();
        let parsed = AneConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.orchestrator.max_rounds, 8);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let parsed = AneConfig::from_yaml("orchestrator:\n  max_rounds: 3\n").unwrap();
        assert_eq!(parsed.orchestrator.max_rounds, 3);
        assert_eq!(parsed.orchestrator.min_compatibility, 0.5);
        assert_eq!(parsed.counter.mitigation_conditions.len(), 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AneConfig::default();
        config.analyzer.weights.risk = -0.1;
        assert!(matches!(config.validate(), Err(AneError::ConfigError(_))));

        let mut config = AneConfig::default();
        config.orchestrator.max_rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scenario_probabilities_normalize() {
        let probs = ScenarioProbabilities {
            best_case: 1.0,
            expected_case: 2.0,
            worst_case: 1.0,
            no_deal: 0.0,
        }
        .normalized();
        let total = probs.best_case + probs.expected_case + probs.worst_case + probs.no_deal;
        assert!((total - 1.0).abs() < 1e-9);
    }
}
