use crate::{
    config::Config,
    redis_client::RedisClient,
    services::presence::{PresenceOracle, RegistryPresence},
    store::{ConversationStore, DeliveryStore, MessageStore},
    websocket::ConnectionRegistry,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub conversations: ConversationStore,
    pub messages: MessageStore,
    pub deliveries: DeliveryStore,
    pub registry: ConnectionRegistry,
    pub presence: Arc<dyn PresenceOracle>,
    /// Offline queue backend; None disables durable queueing (recipients
    /// still reconcile from their delivery records)
    pub redis: Option<RedisClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Assemble a state with registry-backed presence and no queue backend.
    pub fn new(config: Config) -> Self {
        let registry = ConnectionRegistry::new();
        Self {
            conversations: ConversationStore::new(),
            messages: MessageStore::new(),
            deliveries: DeliveryStore::new(),
            presence: Arc::new(RegistryPresence::new(registry.clone())),
            registry,
            redis: None,
            config: Arc::new(config),
        }
    }

    /// Attach a Redis client for durable offline queues.
    pub fn with_redis(mut self, redis: RedisClient) -> Self {
        self.redis = Some(redis);
        self
    }
}
