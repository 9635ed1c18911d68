//! Inbound WebSocket event handling
//!
//! The transport layer parses frames into `WsInboundEvent` and calls in
//! here with explicit caller ids. Acknowledgements advance delivery records
//! through the tracker; the resulting state change is echoed to the message
//! sender when they hold a live connection.

use crate::error::{AppError, AppResult};
use crate::models::delivery::DeliveryRecord;
use crate::queue;
use crate::redis_client::RedisClient;
use crate::services::delivery_tracker::MessageDeliveryTracker;
use crate::store::{DeliveryStore, MessageStore};
use crate::websocket::message_types::WsOutboundEvent;
use crate::websocket::ConnectionRegistry;
use uuid::Uuid;

/// Apply a client delivery acknowledgement.
///
/// `status` is the raw state string from the wire. Unknown strings are a
/// client error; `"sent"` is a regression request and fails loudly inside the
/// tracker. On an applied transition the sender is notified when connected.
pub async fn handle_ack(
    deliveries: &DeliveryStore,
    messages: &MessageStore,
    registry: &ConnectionRegistry,
    message_id: Uuid,
    user_id: Uuid,
    status: &str,
) -> AppResult<DeliveryRecord> {
    let target = status.parse().map_err(AppError::BadRequest)?;

    let outcome =
        MessageDeliveryTracker::apply_ack(deliveries, message_id, user_id, target).await?;

    if outcome.applied() {
        notify_sender(messages, registry, outcome.record()).await;
    }

    Ok(outcome.record().clone())
}

/// Push a delivery-update event to the message sender, fire-and-forget.
async fn notify_sender(
    messages: &MessageStore,
    registry: &ConnectionRegistry,
    record: &DeliveryRecord,
) {
    let Some(message) = messages.get(record.message_id).await else {
        tracing::warn!(
            message_id = %record.message_id,
            "delivery record without a backing message, skipping sender notification"
        );
        return;
    };

    let event = WsOutboundEvent::DeliveryUpdate {
        message_id: record.message_id,
        recipient_id: record.recipient_id,
        status: record.status.to_db().to_string(),
        status_timestamp: record.status_timestamp.to_rfc3339(),
    };

    match serde_json::to_string(&event) {
        Ok(payload) => registry.push_to_user(message.sender_id, payload).await,
        Err(e) => tracing::warn!(error = %e, "failed to serialize delivery update"),
    }
}

/// Drain the payloads queued for a user while they were offline.
/// Entries remain in the stream until the retention trim; `last_id` lets the
/// client resume from its last seen entry.
pub async fn handle_sync(
    redis: &RedisClient,
    cfg: &queue::QueueConfig,
    user_id: Uuid,
    last_id: &str,
) -> AppResult<Vec<queue::QueuedMessage>> {
    let pending = queue::read_queued(redis, cfg, user_id, last_id).await?;
    tracing::debug!(
        user_id = %user_id,
        count = pending.len(),
        "served queued payloads on sync"
    );
    Ok(pending)
}
