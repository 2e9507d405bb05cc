//! Profile store boundary.
//!
//! The engine reads actor snapshots through [`ProfileStore`] and never
//! writes back. [`InMemoryProfileStore`] backs tests, simulations and the
//! offline auditor.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::actor::{Actor, ActorId};
use crate::error::{ProfileError, Result};

/// Read-only source of actor profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a snapshot of an actor.
    async fn get_actor(&self, id: &ActorId) -> Result<Actor>;
}

/// Profile store held entirely in memory.
#[derive(Default)]
pub struct InMemoryProfileStore {
    actors: DashMap<ActorId, Actor>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given actors.
    pub fn with_actors(actors: impl IntoIterator<Item = Actor>) -> Self {
        let store = Self::new();
        for actor in actors {
            store.insert(actor);
        }
        store
    }

    /// Insert or replace an actor.
    pub fn insert(&self, actor: Actor) {
        self.actors.insert(actor.id.clone(), actor);
    }

    /// Remove an actor.
    pub fn remove(&self, id: &ActorId) -> Option<Actor> {
        self.actors.remove(id).map(|(_, actor)| actor)
    }

    /// Number of stored actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_actor(&self, id: &ActorId) -> Result<Actor> {
        debug!(actor_id = %id, "Loading actor profile");
        self.actors
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))
    }
}
