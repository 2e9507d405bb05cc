//! Actor profiles for the Accord negotiation engine.
//!
//! This crate holds the data the engine reads but never owns:
//!
//! - **Actors**: needs, offerings, preferences, constraints and goals
//! - **Terms**: the immutable per-round exchange between two actors
//! - **Profile store**: the read-only boundary actors are loaded through
//!
//! # Example
//!
//! ```ignore
//! use profile::{Actor, InMemoryProfileStore, Need, Priority, ProfileStore, Urgency};
//!
//! let store = InMemoryProfileStore::new();
//! store.insert(
//!     Actor::new("acme", "Acme Robotics", "manufacturing")
//!         .with_need(Need::new("capital", "seed funding", Priority::Critical, Urgency::Weeks)),
//! );
//!
//! let actor = store.get_actor(&"acme".into()).await?;
//! ```

pub mod actor;
pub mod error;
pub mod store;
pub mod terms;
pub mod types;

// Re-export main types
pub use actor::{Actor, ActorId, Constraints, Goal, NegotiationProfile, Need, Offering, Preferences};
pub use error::{ProfileError, Result};
pub use store::{InMemoryProfileStore, ProfileStore};
pub use terms::{Payment, Side, Terms, Timeline};
pub use types::*;
