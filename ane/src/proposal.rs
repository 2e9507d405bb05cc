//! Opening proposals built from two profiles.

use profile::{Actor, Side, Terms};

use crate::similarity::TextMatcher;

/// Offerings of `giver` that meet a need of `receiver`, falling back to
/// the giver's first offering so both sides always contribute something.
fn contributions(giver: &Actor, receiver: &Actor, matcher: &dyn TextMatcher) -> Vec<String> {
    let matched: Vec<String> = giver
        .offerings
        .iter()
        .filter(|o| {
            receiver.needs.iter().any(|n| {
                matcher.matches(&n.description, &o.description)
                    || matcher.matches(&n.category, &o.category)
            })
        })
        .map(|o| o.description.clone())
        .collect();

    if matched.is_empty() {
        giver
            .offerings
            .first()
            .map(|o| vec![o.description.clone()])
            .unwrap_or_default()
    } else {
        matched
    }
}

/// Goal criteria of `actor` that the received items advance.
fn metrics_for(actor: &Actor, received: &[String], matcher: &dyn TextMatcher) -> Vec<String> {
    actor
        .goals
        .iter()
        .flat_map(|g| g.success_criteria.iter())
        .filter(|c| received.iter().any(|r| matcher.matches(c, r)))
        .cloned()
        .collect()
}

/// Build the round-one proposal for a pair.
///
/// Each side gives the offerings that meet the other side's needs. Goal
/// criteria advanced by the exchange become success metrics.
pub fn opening_terms(a: &Actor, b: &Actor, matcher: &dyn TextMatcher) -> Terms {
    let a_gives = contributions(a, b, matcher);
    let b_gives = contributions(b, a, matcher);

    let mut terms = Terms::new(a_gives, b_gives);

    let mut metrics = metrics_for(a, terms.receives(Side::A), matcher);
    for metric in metrics_for(b, terms.receives(Side::B), matcher) {
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    for metric in metrics {
        terms = terms.with_metric(metric);
    }

    terms.with_rationale(format!(
        "Opening exchange between {} and {} based on complementary needs and offerings",
        a.name, b.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::TokenOverlapMatcher;
    use profile::{Goal, Horizon, Need, Offering, Priority, Urgency};

    #[test]
    fn test_opening_terms_exchange_complements() {
        let founder = Actor::new("founder", "Founder Co", "fintech")
            .with_need(Need::new("capital", "seed funding", Priority::Critical, Urgency::Weeks))
            .with_offering(Offering::new("marketing", "brand workshop"))
            .with_offering(Offering::new("engineering", "payments integration"))
            .with_goal(Goal::new("Close the round", Horizon::Short).with_criterion("seed funding"));
        let investor = Actor::new("investor", "Angel Fund", "venture")
            .with_offering(Offering::new("capital", "seed funding"))
            .with_need(Need::new("deals", "payments integration", Priority::High, Urgency::Flexible));

        let terms = opening_terms(&founder, &investor, &TokenOverlapMatcher::new());
        assert_eq!(terms.a_gives, vec!["payments integration".to_string()]);
        assert_eq!(terms.b_gives, vec!["seed funding".to_string()]);
        assert_eq!(terms.success_metrics, vec!["seed funding".to_string()]);
        assert!(!terms.rationale.is_empty());
    }

    #[test]
    fn test_opening_terms_fall_back_to_first_offering() {
        let a = Actor::new("a", "A", "retail").with_offering(Offering::new("retail", "shelf space"));
        let b = Actor::new("b", "B", "media").with_offering(Offering::new("media", "podcast slot"));

        let terms = opening_terms(&a, &b, &TokenOverlapMatcher::new());
        assert_eq!(terms.a_gives, vec!["shelf space".to_string()]);
        assert_eq!(terms.b_gives, vec!["podcast slot".to_string()]);
    }
}
