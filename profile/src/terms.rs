//! Proposal terms.
//!
//! `Terms` is the value exchanged in one negotiation round. It is written
//! from the perspective of the pair (what A gives, what B gives); each
//! actor sees a mirrored view through [`Terms::gives`] and
//! [`Terms::receives`]. Every modification returns a new value so the
//! round history can never be rewritten.

use serde::{Deserialize, Serialize};

/// Which participant of a negotiation an actor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The initiating actor
    A,
    /// The counterpart
    B,
}

impl Side {
    /// The other participant.
    pub fn other(&self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::A => "a",
            Side::B => "b",
        }
    }
}

/// Delivery timeline of a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Free-text description ("kickoff within two weeks")
    pub description: String,
    /// Total duration in days, when known
    pub duration_days: Option<u32>,
}

impl Timeline {
    /// Create a timeline.
    pub fn new(description: impl Into<String>, duration_days: Option<u32>) -> Self {
        Self {
            description: description.into(),
            duration_days,
        }
    }
}

/// Cash component of a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Paying side
    pub from: Side,
    /// Amount in the actors' shared currency
    pub amount: f64,
}

/// One round's concrete exchange between two actors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Terms {
    /// Items actor A gives (and B receives)
    pub a_gives: Vec<String>,
    /// Items actor B gives (and A receives)
    pub b_gives: Vec<String>,
    /// Conditions attached to the exchange
    pub conditions: Vec<String>,
    /// Delivery timeline
    pub timeline: Option<Timeline>,
    /// How success will be measured
    pub success_metrics: Vec<String>,
    /// Why this exchange makes sense
    pub rationale: String,
    /// Cash component
    pub payment: Option<Payment>,
    /// Where the work happens
    pub location: Option<String>,
}

impl Terms {
    /// Create terms from both give lists.
    pub fn new(a_gives: Vec<String>, b_gives: Vec<String>) -> Self {
        Self {
            a_gives,
            b_gives,
            ..Default::default()
        }
    }

    /// Items the given side commits to.
    pub fn gives(&self, side: Side) -> &[String] {
        match side {
            Side::A => &self.a_gives,
            Side::B => &self.b_gives,
        }
    }

    /// Items the given side receives.
    pub fn receives(&self, side: Side) -> &[String] {
        self.gives(side.other())
    }

    /// Whether nothing changes hands in either direction.
    pub fn is_empty(&self) -> bool {
        self.a_gives.is_empty() && self.b_gives.is_empty()
    }

    /// Payment owed by the given side, if any.
    pub fn payment_from(&self, side: Side) -> Option<f64> {
        self.payment
            .as_ref()
            .filter(|p| p.from == side)
            .map(|p| p.amount)
    }

    /// Append an item to what `side` gives.
    pub fn with_give(mut self, side: Side, item: impl Into<String>) -> Self {
        self.gives_mut(side).push(item.into());
        self
    }

    /// Append an item to what `side` receives.
    pub fn with_receive(self, side: Side, item: impl Into<String>) -> Self {
        self.with_give(side.other(), item)
    }

    /// Remove the item at `index` from what `side` gives.
    pub fn without_give(mut self, side: Side, index: usize) -> Self {
        let gives = self.gives_mut(side);
        if index < gives.len() {
            gives.remove(index);
        }
        self
    }

    /// Append a condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Set the timeline.
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    /// Append a success metric.
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.success_metrics.push(metric.into());
        self
    }

    /// Set the rationale.
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Set the payment.
    pub fn with_payment(mut self, from: Side, amount: f64) -> Self {
        self.payment = Some(Payment { from, amount });
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    fn gives_mut(&mut self, side: Side) -> &mut Vec<String> {
        match side {
            Side::A => &mut self.a_gives,
            Side::B => &mut self.b_gives,
        }
    }
}
