//! Synthetic actor populations for offline audits and simulations.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use profile::{
    Actor, Capacity, Goal, Horizon, NegotiationProfile, NegotiationStyle, Need, Offering, Priority,
    Urgency,
};

const INDUSTRIES: &[&str] = &[
    "fintech",
    "healthcare",
    "retail",
    "manufacturing",
    "education",
    "media",
    "logistics",
    "energy",
];

const TITLES: &[&str] = &[
    "CEO",
    "Founder",
    "VP Engineering",
    "Director of Sales",
    "Chief Operating Officer",
    "Product Manager",
    "Engineer",
    "Consultant",
    "Designer",
    "Operations Lead",
    "Analyst",
    "Account Manager",
];

const SKILLS: &[&str] = &[
    "rust",
    "payments",
    "marketing",
    "sales",
    "design",
    "data analysis",
    "logistics",
    "compliance",
    "fundraising",
    "operations",
    "machine learning",
    "supply chain",
];

/// (category, description) pairs actors need and offer.
const EXCHANGES: &[(&str, &str)] = &[
    ("capital", "seed funding"),
    ("engineering", "software development"),
    ("marketing", "brand strategy"),
    ("sales", "enterprise sales introductions"),
    ("legal", "contract review"),
    ("design", "product design"),
    ("logistics", "freight capacity"),
    ("data", "data analytics"),
    ("advisory", "industry mentorship"),
    ("operations", "warehouse space"),
];

const PRIORITIES: &[Priority] = &[Priority::Low, Priority::Medium, Priority::High, Priority::Critical];
const URGENCIES: &[Urgency] = &[Urgency::Flexible, Urgency::Weeks, Urgency::Days, Urgency::Immediate];
const CAPACITIES: &[Capacity] = &[
    Capacity::Limited,
    Capacity::Moderate,
    Capacity::High,
    Capacity::Unlimited,
];
const HORIZONS: &[Horizon] = &[Horizon::Short, Horizon::Medium, Horizon::Long];
const STYLES: &[NegotiationStyle] = &[
    NegotiationStyle::Balanced,
    NegotiationStyle::Competitive,
    NegotiationStyle::Collaborative,
    NegotiationStyle::Accommodating,
];

/// Generates reproducible actor populations from a seed.
pub struct PopulationGenerator {
    rng: StdRng,
}

impl PopulationGenerator {
    /// Create a generator. The same seed always yields the same population.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `size` actors with IDs `actor-0000` onwards.
    pub fn generate(&mut self, size: usize) -> Vec<Actor> {
        (0..size).map(|i| self.actor(i)).collect()
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.gen_range(0..items.len())]
    }

    fn actor(&mut self, index: usize) -> Actor {
        let industry = self.pick(INDUSTRIES);
        let title = self.pick(TITLES);

        let mut actor = Actor::new(
            format!("actor-{:04}", index),
            format!("{} {} #{}", capitalize(industry), title, index),
            industry,
        )
        .with_title(title);

        let skill_count = self.rng.gen_range(2..=4);
        for skill in SKILLS.choose_multiple(&mut self.rng, skill_count) {
            actor = actor.with_skill(*skill);
        }

        let mut exchanges: Vec<(&str, &str)> = EXCHANGES.to_vec();
        exchanges.shuffle(&mut self.rng);
        let need_count = self.rng.gen_range(1..=3);
        let offering_count = self.rng.gen_range(1..=3);

        for (category, description) in exchanges.iter().take(need_count) {
            let need = Need::new(
                *category,
                *description,
                self.pick(PRIORITIES),
                self.pick(URGENCIES),
            )
            .with_flexibility(self.rng.gen_range(0.1..0.9));
            actor = actor.with_need(need);
        }
        for (category, description) in exchanges.iter().skip(need_count).take(offering_count) {
            let offering = Offering::new(*category, *description).with_capacity(self.pick(CAPACITIES));
            actor = actor.with_offering(offering);
        }

        if let Some((_, description)) = exchanges.first() {
            let goal = Goal::new(format!("Secure {}", description), self.pick(HORIZONS))
                .with_criterion(*description);
            actor = actor.with_goal(goal);
        }

        actor.with_negotiation(NegotiationProfile {
            style: self.pick(STYLES),
            risk_tolerance: self.rng.gen_range(0.2..0.9),
            min_acceptable_score: self.rng.gen_range(0.5..0.7),
        })
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_population() {
        let first = PopulationGenerator::new(7).generate(20);
        let second = PopulationGenerator::new(7).generate(20);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_differs() {
        let first = PopulationGenerator::new(1).generate(20);
        let second = PopulationGenerator::new(2).generate(20);
        assert_ne!(first, second);
    }

    #[test]
    fn test_generated_actors_are_valid() {
        let population = PopulationGenerator::new(42).generate(50);
        assert_eq!(population.len(), 50);
        assert_eq!(population[3].id.as_str(), "actor-0003");
        for actor in &population {
            assert!(actor.validate().is_ok());
            assert!(!actor.needs.is_empty());
            assert!(!actor.offerings.is_empty());
            assert!(actor.title.is_some());
        }
    }
}
