//! Audit report.

use serde::{Deserialize, Serialize};

use profile::ActorId;

use crate::config::FindingSeverity;
use crate::scoring::ReasonKind;
use crate::types::ActionKind;

use super::forced::ForcedReason;

/// One evaluated candidate match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Sampled actor
    pub actor: ActorId,
    /// Candidate the actor was matched with
    pub candidate: ActorId,
    /// Candidate's industry
    pub candidate_industry: String,
    /// Candidate's title
    pub candidate_title: Option<String>,
    /// Actor→candidate compatibility
    pub compatibility: f64,
    /// Candidate→actor compatibility
    pub reverse_compatibility: f64,
    /// Whether the two directions differ beyond the asymmetry threshold
    pub asymmetric: bool,
    /// Overall decision score of the sampled actor on the opening terms
    pub overall: f64,
    /// Recommended response
    pub recommendation: ActionKind,
    /// Evidence behind the compatibility score
    pub reasons: Vec<ReasonKind>,
    /// Set when the match is forced
    pub forced: Option<ForcedReason>,
}

impl MatchRecord {
    /// Whether the match is a forced connection.
    pub fn is_forced(&self) -> bool {
        self.forced.is_some()
    }
}

/// Category of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// One counterpart industry dominates the matches
    IndustryDominance,
    /// Executives are over-represented among counterparts
    ExecutiveWeight,
    /// Matches rest on shared skills alone
    SkillOverlapOnly,
    /// Too many matches below the quality threshold
    LowQuality,
    /// A pair could not be evaluated
    SystemError,
}

impl FindingKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::IndustryDominance => "industry_dominance",
            FindingKind::ExecutiveWeight => "executive_weight",
            FindingKind::SkillOverlapOnly => "skill_overlap_only",
            FindingKind::LowQuality => "low_quality",
            FindingKind::SystemError => "system_error",
        }
    }
}

/// A detected problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub kind: FindingKind,
    pub severity: FindingSeverity,
    pub description: String,
    /// Measured ratio, for bias signals
    pub ratio: Option<f64>,
    /// Threshold the ratio exceeded
    pub threshold: Option<f64>,
}

/// Suggested follow-up, ordered by priority in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: FindingSeverity,
    pub action: String,
}

/// Outcome of an audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Actors in the population
    pub population_size: usize,
    /// Actors whose matches were evaluated
    pub sampled_actors: usize,
    /// Matches evaluated
    pub total_matches: usize,
    /// Forced connections found
    pub forced_count: usize,
    /// Forced connections as a percentage of all matches
    pub forced_percentage: f64,
    /// Findings, most severe first
    pub findings: Vec<AuditFinding>,
    /// Recommendations, most urgent first
    pub recommendations: Vec<Recommendation>,
    /// Every evaluated match, in sampling order
    pub matches: Vec<MatchRecord>,
}

impl AuditReport {
    /// Assemble a report from evaluated matches and findings.
    pub fn new(
        population_size: usize,
        sampled_actors: usize,
        matches: Vec<MatchRecord>,
        mut findings: Vec<AuditFinding>,
    ) -> Self {
        let total_matches = matches.len();
        let forced_count = matches.iter().filter(|m| m.is_forced()).count();
        let forced_percentage = if total_matches == 0 {
            0.0
        } else {
            forced_count as f64 / total_matches as f64 * 100.0
        };

        findings.sort_by(|x, y| y.severity.cmp(&x.severity));
        let recommendations = recommend(&findings, forced_count, forced_percentage);

        Self {
            population_size,
            sampled_actors,
            total_matches,
            forced_count,
            forced_percentage,
            findings,
            recommendations,
            matches,
        }
    }

    /// Findings of one kind.
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &AuditFinding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn recommend(
    findings: &[AuditFinding],
    forced_count: usize,
    forced_percentage: f64,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = Vec::new();

    if forced_count > 0 {
        recommendations.push(Recommendation {
            priority: if forced_percentage > 20.0 {
                FindingSeverity::High
            } else {
                FindingSeverity::Medium
            },
            action: format!(
                "Review {} forced connections ({:.1}%) and tighten the compatibility threshold",
                forced_count, forced_percentage
            ),
        });
    }

    for finding in findings {
        let action = match finding.kind {
            FindingKind::IndustryDominance => {
                "Diversify candidate pools across industries".to_string()
            }
            FindingKind::ExecutiveWeight => {
                "Reduce the influence of titles on candidate ranking".to_string()
            }
            FindingKind::SkillOverlapOnly => {
                "Weight need/offering complementarity above shared skills".to_string()
            }
            FindingKind::LowQuality => {
                "Raise the minimum compatibility for proposed matches".to_string()
            }
            FindingKind::SystemError => format!("Fix evaluation failure: {}", finding.description),
        };
        if !recommendations.iter().any(|r| r.action == action) {
            recommendations.push(Recommendation {
                priority: finding.severity,
                action,
            });
        }
    }

    recommendations.sort_by(|x, y| y.priority.cmp(&x.priority));
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(forced: Option<ForcedReason>) -> MatchRecord {
        MatchRecord {
            actor: "a".into(),
            candidate: "b".into(),
            candidate_industry: "retail".to_string(),
            candidate_title: None,
            compatibility: 0.35,
            reverse_compatibility: 0.35,
            asymmetric: false,
            overall: 0.75,
            recommendation: ActionKind::Accept,
            reasons: Vec::new(),
            forced,
        }
    }

    fn finding(kind: FindingKind, severity: FindingSeverity) -> AuditFinding {
        AuditFinding {
            kind,
            severity,
            description: kind.as_str().to_string(),
            ratio: Some(0.7),
            threshold: Some(0.6),
        }
    }

    #[test]
    fn test_forced_percentage() {
        let report = AuditReport::new(
            10,
            2,
            vec![
                record(Some(ForcedReason::LowCompatibility)),
                record(None),
                record(None),
                record(None),
            ],
            Vec::new(),
        );
        assert_eq!(report.total_matches, 4);
        assert_eq!(report.forced_count, 1);
        assert!((report.forced_percentage - 25.0).abs() < 1e-9);
        assert_eq!(report.recommendations[0].priority, FindingSeverity::High);
    }

    #[test]
    fn test_findings_and_recommendations_ranked() {
        let report = AuditReport::new(
            10,
            2,
            Vec::new(),
            vec![
                finding(FindingKind::ExecutiveWeight, FindingSeverity::Medium),
                finding(FindingKind::SystemError, FindingSeverity::Critical),
                finding(FindingKind::IndustryDominance, FindingSeverity::High),
            ],
        );
        assert_eq!(report.findings[0].kind, FindingKind::SystemError);
        assert_eq!(report.findings[2].kind, FindingKind::ExecutiveWeight);
        assert!(report
            .recommendations
            .windows(2)
            .all(|w| w[0].priority >= w[1].priority));
        assert_eq!(report.forced_percentage, 0.0);
    }

    #[test]
    fn test_report_serializes() {
        let report = AuditReport::new(1, 1, vec![record(None)], Vec::new());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"total_matches\": 1"));
    }
}
