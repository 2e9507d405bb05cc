//! Registry of pairs with a live negotiation.

use std::collections::HashMap;
use tokio::sync::Mutex;

use profile::ActorId;

use crate::types::NegotiationId;

/// Unordered pair of actors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(ActorId, ActorId);

impl PairKey {
    /// Key for a pair; `(a, b)` and `(b, a)` give the same key.
    pub fn new(a: &ActorId, b: &ActorId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }

    /// Whether the actor is part of the pair.
    pub fn contains(&self, actor: &ActorId) -> bool {
        &self.0 == actor || &self.1 == actor
    }
}

/// Enforces at most one live negotiation per pair.
#[derive(Debug, Default)]
pub struct PairRegistry {
    active: Mutex<HashMap<PairKey, NegotiationId>>,
}

impl PairRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the pair for `id`. Returns the holder when already claimed.
    pub async fn try_reserve(&self, key: PairKey, id: NegotiationId) -> Result<(), NegotiationId> {
        let mut active = self.active.lock().await;
        if let Some(existing) = active.get(&key) {
            return Err(existing.clone());
        }
        active.insert(key, id);
        Ok(())
    }

    /// Release the pair if `id` still holds it.
    pub async fn release(&self, key: &PairKey, id: &NegotiationId) {
        let mut active = self.active.lock().await;
        if active.get(key) == Some(id) {
            active.remove(key);
        }
    }

    /// Number of live negotiations the actor takes part in.
    pub async fn count_for(&self, actor: &ActorId) -> usize {
        let active = self.active.lock().await;
        active.keys().filter(|k| k.contains(actor)).count()
    }

    /// Number of claimed pairs.
    pub async fn len(&self) -> usize {
        self.active.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        let a = ActorId::from("a");
        let b = ActorId::from("b");
        assert_eq!(PairKey::new(&a, &b), PairKey::new(&b, &a));
    }

    #[tokio::test]
    async fn test_second_reservation_is_refused() {
        let registry = PairRegistry::new();
        let key = PairKey::new(&"a".into(), &"b".into());
        let first = NegotiationId::new();

        assert!(registry.try_reserve(key.clone(), first.clone()).await.is_ok());
        let refused = registry
            .try_reserve(PairKey::new(&"b".into(), &"a".into()), NegotiationId::new())
            .await;
        assert_eq!(refused, Err(first.clone()));

        registry.release(&key, &first).await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_release_ignores_other_holder() {
        let registry = PairRegistry::new();
        let key = PairKey::new(&"a".into(), &"b".into());
        let holder = NegotiationId::new();
        registry.try_reserve(key.clone(), holder).await.unwrap();

        registry.release(&key, &NegotiationId::new()).await;
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.count_for(&"a".into()).await, 1);
        assert_eq!(registry.count_for(&"c".into()).await, 0);
    }
}
