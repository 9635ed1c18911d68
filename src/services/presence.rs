//! Presence boundary consumed by fan-out
//!
//! The core does not implement presence tracking; it only depends on this
//! boolean predicate. Implementations are expected to be fast and local.
//! Callers treat an error as "unreachable" and queue instead of pushing.

use crate::error::AppResult;
use crate::websocket::ConnectionRegistry;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait PresenceOracle: Send + Sync {
    /// Whether the user currently has a reachable live connection
    async fn is_reachable(&self, user_id: Uuid) -> AppResult<bool>;
}

/// Default oracle: a user is reachable while they hold at least one
/// registered WebSocket subscriber.
pub struct RegistryPresence {
    registry: ConnectionRegistry,
}

impl RegistryPresence {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl PresenceOracle for RegistryPresence {
    async fn is_reachable(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.registry.is_connected(user_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_presence_follows_subscriptions() {
        let registry = ConnectionRegistry::new();
        let presence = RegistryPresence::new(registry.clone());
        let user = Uuid::new_v4();

        assert!(!presence.is_reachable(user).await.unwrap());

        let (_id, _rx) = registry.add_subscriber(user).await;
        assert!(presence.is_reachable(user).await.unwrap());
    }
}
