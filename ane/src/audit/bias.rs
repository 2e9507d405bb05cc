//! Bias detectors.
//!
//! Each detector measures one ratio over the evaluated matches and reports
//! a finding when it exceeds the configured threshold:
//! - **Industry dominance**: share of the most common counterpart industry
//! - **Executive weight**: share of counterparts with executive titles
//! - **Skill overlap only**: share of matches backed by shared skills alone
//! - **Low quality**: share of matches below the compatibility floor
//!
//! Findings are reported, never corrected.

use std::collections::HashMap;

use crate::config::{AuditorConfig, BiasRule};
use crate::scoring::ReasonKind;

use super::report::{AuditFinding, FindingKind, MatchRecord};

const EXECUTIVE_MARKERS: &[&str] = &["ceo", "founder", "chief", "vp", "director", "president"];

/// Common trait for bias detectors.
pub trait BiasDetector: Send + Sync {
    /// Name of the detector.
    fn name(&self) -> &str;

    /// Kind of finding produced.
    fn kind(&self) -> FindingKind;

    /// Threshold and severity.
    fn rule(&self) -> BiasRule;

    /// Measured ratio (0.0 - 1.0). Zero for an empty match set.
    fn ratio(&self, matches: &[MatchRecord]) -> f64;

    /// Human-readable description of a detected signal.
    fn describe(&self, ratio: f64) -> String;

    /// Finding when the ratio exceeds the threshold.
    fn analyze(&self, matches: &[MatchRecord]) -> Option<AuditFinding> {
        let rule = self.rule();
        let ratio = self.ratio(matches);
        if ratio > rule.threshold {
            Some(AuditFinding {
                kind: self.kind(),
                severity: rule.severity,
                description: self.describe(ratio),
                ratio: Some(ratio),
                threshold: Some(rule.threshold),
            })
        } else {
            None
        }
    }
}

fn share(matches: &[MatchRecord], predicate: impl Fn(&MatchRecord) -> bool) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    matches.iter().filter(|m| predicate(m)).count() as f64 / matches.len() as f64
}

/// Flags one counterpart industry taking most matches.
pub struct IndustryDominanceDetector {
    rule: BiasRule,
}

impl IndustryDominanceDetector {
    pub fn new(rule: BiasRule) -> Self {
        Self { rule }
    }

    /// Most common counterpart industry and its share.
    pub fn dominant(matches: &[MatchRecord]) -> Option<(String, f64)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for m in matches {
            *counts.entry(m.candidate_industry.to_lowercase()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|x, y| x.1.cmp(&y.1).then_with(|| y.0.cmp(&x.0)))
            .map(|(industry, count)| (industry, count as f64 / matches.len() as f64))
    }
}

impl BiasDetector for IndustryDominanceDetector {
    fn name(&self) -> &str {
        "industry_dominance"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::IndustryDominance
    }

    fn rule(&self) -> BiasRule {
        self.rule
    }

    fn ratio(&self, matches: &[MatchRecord]) -> f64 {
        Self::dominant(matches).map_or(0.0, |(_, ratio)| ratio)
    }

    fn describe(&self, ratio: f64) -> String {
        format!(
            "{:.0}% of matched counterparts come from a single industry",
            ratio * 100.0
        )
    }
}

/// Flags matching that favors executive titles.
pub struct ExecutiveWeightDetector {
    rule: BiasRule,
}

impl ExecutiveWeightDetector {
    pub fn new(rule: BiasRule) -> Self {
        Self { rule }
    }

    /// Whether a title reads as executive.
    pub fn is_executive(title: &str) -> bool {
        let title = title.to_lowercase();
        title
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| EXECUTIVE_MARKERS.contains(&word))
    }
}

impl BiasDetector for ExecutiveWeightDetector {
    fn name(&self) -> &str {
        "executive_weight"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::ExecutiveWeight
    }

    fn rule(&self) -> BiasRule {
        self.rule
    }

    fn ratio(&self, matches: &[MatchRecord]) -> f64 {
        share(matches, |m| {
            m.candidate_title
                .as_deref()
                .map_or(false, Self::is_executive)
        })
    }

    fn describe(&self, ratio: f64) -> String {
        format!(
            "{:.0}% of matched counterparts hold executive titles",
            ratio * 100.0
        )
    }
}

/// Flags matches justified only by shared skills.
pub struct SkillOverlapOnlyDetector {
    rule: BiasRule,
}

impl SkillOverlapOnlyDetector {
    pub fn new(rule: BiasRule) -> Self {
        Self { rule }
    }
}

impl BiasDetector for SkillOverlapOnlyDetector {
    fn name(&self) -> &str {
        "skill_overlap_only"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::SkillOverlapOnly
    }

    fn rule(&self) -> BiasRule {
        self.rule
    }

    fn ratio(&self, matches: &[MatchRecord]) -> f64 {
        share(matches, |m| {
            m.reasons.contains(&ReasonKind::SkillMatch)
                && !m.reasons.iter().any(|r| {
                    matches!(r, ReasonKind::ComplementaryNeed | ReasonKind::BusinessOpportunity)
                })
        })
    }

    fn describe(&self, ratio: f64) -> String {
        format!(
            "{:.0}% of matches rest on shared skills without complementary value",
            ratio * 100.0
        )
    }
}

/// Flags a high share of weak matches.
pub struct LowQualityDetector {
    rule: BiasRule,
    min_compatibility: f64,
}

impl LowQualityDetector {
    pub fn new(rule: BiasRule, min_compatibility: f64) -> Self {
        Self {
            rule,
            min_compatibility,
        }
    }
}

impl BiasDetector for LowQualityDetector {
    fn name(&self) -> &str {
        "low_quality"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::LowQuality
    }

    fn rule(&self) -> BiasRule {
        self.rule
    }

    fn ratio(&self, matches: &[MatchRecord]) -> f64 {
        share(matches, |m| m.compatibility < self.min_compatibility)
    }

    fn describe(&self, ratio: f64) -> String {
        format!(
            "{:.0}% of matches score below {:.2} compatibility",
            ratio * 100.0,
            self.min_compatibility
        )
    }
}

/// The four standard detectors configured from `config`.
pub fn default_detectors(config: &AuditorConfig) -> Vec<Box<dyn BiasDetector>> {
    vec![
        Box::new(IndustryDominanceDetector::new(config.industry_dominance)),
        Box::new(ExecutiveWeightDetector::new(config.executive_weight)),
        Box::new(SkillOverlapOnlyDetector::new(config.skill_overlap_only)),
        Box::new(LowQualityDetector::new(
            config.low_quality,
            config.low_quality_compatibility,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FindingSeverity;
    use crate::types::ActionKind;

    fn record(industry: &str, title: &str, compatibility: f64, reasons: Vec<ReasonKind>) -> MatchRecord {
        MatchRecord {
            actor: "a".into(),
            candidate: "b".into(),
            candidate_industry: industry.to_string(),
            candidate_title: Some(title.to_string()),
            compatibility,
            reverse_compatibility: compatibility,
            asymmetric: false,
            overall: 0.6,
            recommendation: ActionKind::Accept,
            reasons,
            forced: None,
        }
    }

    #[test]
    fn test_industry_dominance() {
        let config = AuditorConfig::default();
        let detector = IndustryDominanceDetector::new(config.industry_dominance);
        let matches = vec![
            record("fintech", "Engineer", 0.7, vec![]),
            record("Fintech", "Engineer", 0.7, vec![]),
            record("fintech", "Engineer", 0.7, vec![]),
            record("retail", "Engineer", 0.7, vec![]),
        ];

        let finding = detector.analyze(&matches).unwrap();
        assert_eq!(finding.kind, FindingKind::IndustryDominance);
        assert_eq!(finding.severity, FindingSeverity::High);
        assert_eq!(finding.ratio, Some(0.75));
    }

    #[test]
    fn test_executive_titles() {
        assert!(ExecutiveWeightDetector::is_executive("VP Engineering"));
        assert!(ExecutiveWeightDetector::is_executive("Chief Operating Officer"));
        assert!(!ExecutiveWeightDetector::is_executive("Product Manager"));
        assert!(!ExecutiveWeightDetector::is_executive("Vpn Engineer"));
    }

    #[test]
    fn test_skill_overlap_only() {
        let detector = SkillOverlapOnlyDetector::new(AuditorConfig::default().skill_overlap_only);
        let matches = vec![
            record("a", "x", 0.6, vec![ReasonKind::SkillMatch]),
            record("b", "x", 0.6, vec![ReasonKind::SkillMatch, ReasonKind::ComplementaryNeed]),
        ];
        assert_eq!(detector.ratio(&matches), 0.5);
        assert!(detector.analyze(&matches).is_some());
    }

    #[test]
    fn test_low_quality_below_threshold_is_silent() {
        let config = AuditorConfig::default();
        let detector = LowQualityDetector::new(config.low_quality, config.low_quality_compatibility);
        let matches = vec![
            record("a", "x", 0.4, vec![]),
            record("b", "x", 0.7, vec![]),
            record("c", "x", 0.8, vec![]),
            record("d", "x", 0.9, vec![]),
        ];
        assert_eq!(detector.ratio(&matches), 0.25);
        assert!(detector.analyze(&matches).is_none());
    }

    #[test]
    fn test_empty_matches_report_nothing() {
        let detectors = default_detectors(&AuditorConfig::default());
        assert!(detectors.iter().all(|d| d.analyze(&[]).is_none()));
    }
}
