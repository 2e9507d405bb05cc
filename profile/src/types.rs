//! Ordinal scales shared by needs, offerings and goals.
//!
//! Each scale is a closed enumeration so invalid levels cannot be
//! represented. Numeric mappings used by the scoring code live here, next
//! to the scale they interpret.

use serde::{Deserialize, Serialize};

/// How important a need is to the actor holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Nice to have
    Low = 0,
    /// Standard priority
    Medium = 1,
    /// Strongly wanted
    High = 2,
    /// The actor cannot proceed without it
    Critical = 3,
}

impl Priority {
    /// Weight of a need at this priority when computing satisfaction.
    pub fn weight(&self) -> f64 {
        match self {
            Priority::Critical => 1.0,
            Priority::High => 0.7,
            Priority::Medium => 0.5,
            Priority::Low => 0.3,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// How soon a need has to be met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// No particular deadline
    Flexible = 0,
    /// Within a few weeks
    Weeks = 1,
    /// Within days
    Days = 2,
    /// Right now
    Immediate = 3,
}

impl Urgency {
    /// Whether the need should shape the proposal timeline.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Urgency::Days | Urgency::Immediate)
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Flexible
    }
}

/// How much of an offering the actor can still provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    /// Scarce, every commitment hurts
    Limited = 0,
    /// Some room left
    Moderate = 1,
    /// Plenty available
    High = 2,
    /// Effectively free to give
    Unlimited = 3,
}

impl Capacity {
    /// Remaining capacity on a 0-1 scale.
    pub fn level(&self) -> f64 {
        match self {
            Capacity::Limited => 0.25,
            Capacity::Moderate => 0.5,
            Capacity::High => 0.75,
            Capacity::Unlimited => 1.0,
        }
    }

    /// Estimated cost of committing this offering. Lower remaining
    /// capacity means a higher cost.
    pub fn give_cost(&self) -> f64 {
        match self {
            Capacity::Limited => 0.7,
            Capacity::Moderate => 0.5,
            Capacity::High => 0.3,
            Capacity::Unlimited => 0.1,
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::Moderate
    }
}

/// Time horizon of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// This quarter
    Short,
    /// This year
    Medium,
    /// Multi-year
    Long,
}

impl Horizon {
    /// Urgency weight used when a goal is advanced by a proposal.
    pub fn urgency_weight(&self) -> f64 {
        match self {
            Horizon::Short => 1.0,
            Horizon::Medium => 0.7,
            Horizon::Long => 0.4,
        }
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self::Medium
    }
}

/// Declared negotiation style of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStyle {
    /// No stylistic bias
    Balanced,
    /// Maximize own value
    Competitive,
    /// Look for joint gains
    Collaborative,
    /// Prioritize the relationship
    Accommodating,
}

impl NegotiationStyle {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationStyle::Balanced => "balanced",
            NegotiationStyle::Competitive => "competitive",
            NegotiationStyle::Collaborative => "collaborative",
            NegotiationStyle::Accommodating => "accommodating",
        }
    }
}

impl Default for NegotiationStyle {
    fn default() -> Self {
        Self::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_weights_are_ordered() {
        assert!(Priority::Critical.weight() > Priority::High.weight());
        assert!(Priority::High.weight() > Priority::Medium.weight());
        assert!(Priority::Medium.weight() > Priority::Low.weight());
    }

    #[test]
    fn test_capacity_cost_falls_as_capacity_rises() {
        assert!(Capacity::Limited.give_cost() > Capacity::Unlimited.give_cost());
        assert!(Capacity::Moderate.level() > 0.4);
        assert!(Capacity::Limited.level() < 0.4);
    }

    #[test]
    fn test_enum_serde_names() {
        let json = serde_json::to_string(&Urgency::Immediate).unwrap();
        assert_eq!(json, "\"immediate\"");
        let style: NegotiationStyle = serde_json::from_str("\"collaborative\"").unwrap();
        assert_eq!(style, NegotiationStyle::Collaborative);
    }
}
