//! Autonomous Negotiation Engine (ANE)
//!
//! Matches actors with complementary needs and offerings and negotiates
//! exchanges between them:
//!
//! - **Compatibility scoring**: Pairwise, direction-aware affinity
//! - **Decision analysis**: Six weighted criteria, alternatives and scenarios
//! - **Counter-offers**: Terms reshaped around an actor's weaknesses
//! - **Negotiation**: Round-based state machine with deadlines and round caps
//! - **Quality audit**: Offline detection of forced matches and bias
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────────────────────────┐
//! │ ProfileStore │──▶│          NegotiationOrchestrator             │
//! └──────────────┘   │                                              │
//!                    │  ┌─────────────┐  ┌──────────┐  ┌─────────┐  │
//!                    │  │Compatibility│──│ Decision │──│ Counter │  │
//!                    │  │   Scorer    │  │ Analyzer │  │  Offer  │  │
//!                    │  └─────────────┘  └──────────┘  └─────────┘  │
//!                    └──────────────────────┬───────────────────────┘
//!                                           │
//!                                   ┌───────▼───────┐
//!                                   │  Persistence  │
//!                                   └───────────────┘
//! ```
//!
//! The [`audit::QualityAuditor`] reuses the scorer and analyzer offline to
//! look for degenerate matching across a population.

pub mod audit;
pub mod config;
pub mod counter;
pub mod decision;
pub mod ledger;
pub mod negotiation;
pub mod proposal;
pub mod scoring;
pub mod similarity;
pub mod types;

// Re-export main types
pub use audit::{AuditReport, QualityAuditor};
pub use config::AneConfig;
pub use counter::CounterOfferGenerator;
pub use decision::DecisionAnalyzer;
pub use ledger::{InMemoryLedger, Persistence};
pub use negotiation::{NegotiationOrchestrator, OrchestratorBuilder};
pub use scoring::CompatibilityScorer;
pub use types::*;
