//! Forced-connection classification.

use serde::{Deserialize, Serialize};

use crate::config::AuditorConfig;
use crate::scoring::MatchReason;

/// Why a match counts as forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedReason {
    /// High decision score despite low compatibility
    LowCompatibility,
    /// High decision score with no substantive reason behind the match
    NoSubstantiveReason,
}

/// Classify one evaluated match. Returns `None` for genuine matches.
pub fn classify_match(
    compatibility: f64,
    overall: f64,
    reasons: &[MatchReason],
    config: &AuditorConfig,
) -> Option<ForcedReason> {
    if compatibility < config.forced_compatibility && overall > config.forced_overall {
        return Some(ForcedReason::LowCompatibility);
    }
    let substantive = reasons.iter().any(|r| r.kind.is_substantive());
    if !substantive && overall > config.unreasoned_overall {
        return Some(ForcedReason::NoSubstantiveReason);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ReasonKind;

    fn reason(kind: ReasonKind) -> MatchReason {
        MatchReason {
            kind,
            detail: String::new(),
        }
    }

    #[test]
    fn test_low_compatibility_high_score_is_forced() {
        let config = AuditorConfig::default();
        let reasons = vec![reason(ReasonKind::ComplementaryNeed)];
        assert_eq!(
            classify_match(0.35, 0.75, &reasons, &config),
            Some(ForcedReason::LowCompatibility)
        );
    }

    #[test]
    fn test_unreasoned_match_is_forced() {
        let config = AuditorConfig::default();
        let reasons = vec![reason(ReasonKind::IndustryAffinity)];
        assert_eq!(
            classify_match(0.6, 0.65, &reasons, &config),
            Some(ForcedReason::NoSubstantiveReason)
        );
    }

    #[test]
    fn test_genuine_match_is_not_forced() {
        let config = AuditorConfig::default();
        let reasons = vec![reason(ReasonKind::SkillMatch)];
        assert_eq!(classify_match(0.7, 0.8, &reasons, &config), None);
        assert_eq!(classify_match(0.35, 0.5, &[], &config), None);
    }
}
