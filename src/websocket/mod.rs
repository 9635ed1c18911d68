use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod handlers;
pub mod message_types;

/// Unique identifier for a WebSocket subscriber
///
/// Each WebSocket connection gets a unique subscriber ID when it registers.
/// This allows for precise cleanup when connections close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber entry with ID and channel
struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<String>,
}

/// Connection registry for WebSocket subscribers, keyed by user
///
/// Tracks which users currently hold a live connection. A user with at least
/// one registered subscriber is reachable for live push; everyone else gets
/// queued delivery. Supports precise cleanup using subscriber IDs to prevent
/// memory leaks.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    // user_id -> list of subscribers
    inner: Arc<RwLock<HashMap<Uuid, Vec<Subscriber>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for a user
    ///
    /// Returns a tuple of (subscriber_id, receiver) where:
    /// - subscriber_id: Unique ID for this subscription (used for cleanup)
    /// - receiver: Channel to receive pushed payloads
    pub async fn add_subscriber(&self, user_id: Uuid) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = SubscriberId::new();

        let subscriber = Subscriber {
            id: subscriber_id,
            sender: tx,
        };

        let mut guard = self.inner.write().await;
        guard.entry(user_id).or_default().push(subscriber);

        tracing::debug!(
            "Added subscriber {:?} for user {}, total subscribers: {}",
            subscriber_id,
            user_id,
            guard.get(&user_id).map(|v| v.len()).unwrap_or(0)
        );

        (subscriber_id, rx)
    }

    /// Remove a specific subscriber for a user
    ///
    /// Must be called when a WebSocket connection closes so stale users do
    /// not keep reading as reachable.
    pub async fn remove_subscriber(&self, user_id: Uuid, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;

        if let Some(subscribers) = guard.get_mut(&user_id) {
            let before = subscribers.len();
            subscribers.retain(|s| s.id != subscriber_id);
            let after = subscribers.len();

            if before != after {
                tracing::debug!(
                    "Removed subscriber {:?} for user {}, remaining: {}",
                    subscriber_id,
                    user_id,
                    after
                );
            }

            // Clean up empty user entries
            if subscribers.is_empty() {
                guard.remove(&user_id);
                tracing::debug!("Removed disconnected user {} from registry", user_id);
            }
        }
    }

    /// Push a payload to all of a user's subscribers
    ///
    /// Fire-and-forget: dead senders are cleaned up, send failures are never
    /// surfaced to the caller.
    pub async fn push_to_user(&self, user_id: Uuid, msg: String) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&user_id) {
            let before = subscribers.len();

            subscribers.retain(|subscriber| subscriber.sender.send(msg.clone()).is_ok());

            let after = subscribers.len();
            if before != after {
                tracing::debug!(
                    "Push to user {}: {} dead senders cleaned up, {} active",
                    user_id,
                    before - after,
                    after
                );
            }
            if subscribers.is_empty() {
                guard.remove(&user_id);
            }
        }
    }

    /// Whether the user currently has at least one live subscriber
    pub async fn is_connected(&self, user_id: Uuid) -> bool {
        let guard = self.inner.read().await;
        guard.get(&user_id).map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Subscriber count for a user (for debugging/metrics)
    pub async fn subscriber_count(&self, user_id: Uuid) -> usize {
        let guard = self.inner.read().await;
        guard.get(&user_id).map(|v| v.len()).unwrap_or(0)
    }
}
