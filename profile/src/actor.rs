//! Actor profiles.
//!
//! An actor is a participant that brings needs and offerings to a match.
//! Profiles are owned by the external profile store; the engine only ever
//! works on snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProfileError, Result};
use crate::types::{Capacity, Horizon, NegotiationStyle, Priority, Urgency};

/// Stable identifier of an actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    /// Borrow the raw ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Something an actor is looking for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Need {
    /// Broad category (e.g. "capital", "engineering")
    pub category: String,
    /// Free-text description
    pub description: String,
    /// How important the need is
    pub priority: Priority,
    /// How soon it has to be met
    pub urgency: Urgency,
    /// Willingness to accept partial substitutes (0.0 - 1.0)
    pub flexibility: f64,
}

impl Need {
    /// Create a need with medium flexibility.
    pub fn new(
        category: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        urgency: Urgency,
    ) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            priority,
            urgency,
            flexibility: 0.5,
        }
    }

    /// Set flexibility.
    pub fn with_flexibility(mut self, flexibility: f64) -> Self {
        self.flexibility = flexibility;
        self
    }
}

/// Something an actor can provide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    /// Broad category
    pub category: String,
    /// Free-text description
    pub description: String,
    /// What the counterpart gains from it
    pub value_description: String,
    /// Remaining capacity
    pub capacity: Capacity,
    /// Conditions attached to the offering
    pub conditions: Option<String>,
}

impl Offering {
    /// Create an offering with moderate capacity.
    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            category: category.into(),
            value_description: description.clone(),
            description,
            capacity: Capacity::Moderate,
            conditions: None,
        }
    }

    /// Set capacity.
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the value description.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value_description = value.into();
        self
    }

    /// Attach conditions.
    pub fn with_conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }
}

/// What an actor will and will not accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Terms that end a negotiation if the actor has to give them
    pub deal_breakers: Vec<String>,
    /// Items the actor expects to receive
    pub must_haves: Vec<String>,
    /// Counterpart categories the actor prefers to work with
    pub preferred_categories: Vec<String>,
}

/// Hard limits on what an actor can commit to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Maximum cash the actor can pay
    pub max_budget: Option<f64>,
    /// Longest engagement the actor can take on, in days
    pub max_duration_days: Option<u32>,
    /// Regions the actor can operate in (empty = anywhere)
    pub regions: Vec<String>,
}

/// A goal the actor is working toward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal description
    pub description: String,
    /// Observable signals that the goal is met
    pub success_criteria: Vec<String>,
    /// Time horizon
    pub horizon: Horizon,
}

impl Goal {
    /// Create a goal.
    pub fn new(description: impl Into<String>, horizon: Horizon) -> Self {
        Self {
            description: description.into(),
            success_criteria: Vec::new(),
            horizon,
        }
    }

    /// Add a success criterion.
    pub fn with_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.success_criteria.push(criterion.into());
        self
    }
}

/// How an actor negotiates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationProfile {
    /// Declared style
    pub style: NegotiationStyle,
    /// Appetite for risk (0.0 - 1.0)
    pub risk_tolerance: f64,
    /// Lowest overall score the actor will accept (0.0 - 1.0)
    pub min_acceptable_score: f64,
}

impl Default for NegotiationProfile {
    fn default() -> Self {
        Self {
            style: NegotiationStyle::Balanced,
            risk_tolerance: 0.5,
            min_acceptable_score: 0.6,
        }
    }
}

/// A participant in matching and negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique actor ID
    pub id: ActorId,
    /// Display name
    pub name: String,
    /// Industry the actor operates in
    pub industry: String,
    /// Title of the actor's representative
    pub title: Option<String>,
    /// Skills the actor brings
    pub skills: Vec<String>,
    /// Needs, most important first
    pub needs: Vec<Need>,
    /// Offerings, most important first
    pub offerings: Vec<Offering>,
    /// Preferences (required for decision analysis)
    pub preferences: Option<Preferences>,
    /// Constraints (required for decision analysis)
    pub constraints: Option<Constraints>,
    /// Goals, most important first
    pub goals: Vec<Goal>,
    /// Negotiation behaviour
    pub negotiation: NegotiationProfile,
}

impl Actor {
    /// Create an actor with empty preferences and constraints.
    pub fn new(id: impl Into<ActorId>, name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            industry: industry.into(),
            title: None,
            skills: Vec::new(),
            needs: Vec::new(),
            offerings: Vec::new(),
            preferences: Some(Preferences::default()),
            constraints: Some(Constraints::default()),
            goals: Vec::new(),
            negotiation: NegotiationProfile::default(),
        }
    }

    /// Set the representative's title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Add a need.
    pub fn with_need(mut self, need: Need) -> Self {
        self.needs.push(need);
        self
    }

    /// Add an offering.
    pub fn with_offering(mut self, offering: Offering) -> Self {
        self.offerings.push(offering);
        self
    }

    /// Add a goal.
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    /// Replace preferences.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Replace constraints.
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Replace the negotiation profile.
    pub fn with_negotiation(mut self, negotiation: NegotiationProfile) -> Self {
        self.negotiation = negotiation;
        self
    }

    /// Needs at critical priority.
    pub fn critical_needs(&self) -> impl Iterator<Item = &Need> {
        self.needs.iter().filter(|n| n.priority == Priority::Critical)
    }

    /// Check the numeric invariants of the profile.
    pub fn validate(&self) -> Result<()> {
        for need in &self.needs {
            if !(0.0..=1.0).contains(&need.flexibility) {
                return Err(self.invalid(format!(
                    "flexibility of need '{}' is {}, expected 0.0 - 1.0",
                    need.description, need.flexibility
                )));
            }
        }

        let negotiation = &self.negotiation;
        if !(0.0..=1.0).contains(&negotiation.risk_tolerance) {
            return Err(self.invalid(format!(
                "risk tolerance is {}, expected 0.0 - 1.0",
                negotiation.risk_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&negotiation.min_acceptable_score) {
            return Err(self.invalid(format!(
                "minimum acceptable score is {}, expected 0.0 - 1.0",
                negotiation.min_acceptable_score
            )));
        }

        if let Some(budget) = self.constraints.as_ref().and_then(|c| c.max_budget) {
            if !budget.is_finite() || budget < 0.0 {
                return Err(self.invalid(format!("max budget is {}", budget)));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> ProfileError {
        ProfileError::Invalid {
            actor_id: self.id.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let actor = Actor::new("a1", "Acme", "manufacturing")
            .with_title("CEO")
            .with_need(Need::new("capital", "seed funding", Priority::Critical, Urgency::Weeks));

        assert_eq!(actor.id.as_str(), "a1");
        assert!(actor.preferences.is_some());
        assert!(actor.constraints.is_some());
        assert_eq!(actor.critical_needs().count(), 1);
        assert!(actor.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_flexibility() {
        let actor = Actor::new("a1", "Acme", "manufacturing").with_need(
            Need::new("capital", "seed funding", Priority::High, Urgency::Days).with_flexibility(1.5),
        );

        let err = actor.validate().unwrap_err();
        assert!(matches!(err, ProfileError::Invalid { .. }));
    }

    #[test]
    fn test_validate_rejects_nan_tolerance() {
        let actor = Actor::new("a1", "Acme", "manufacturing").with_negotiation(NegotiationProfile {
            risk_tolerance: f64::NAN,
            ..Default::default()
        });

        assert!(actor.validate().is_err());
    }
}
