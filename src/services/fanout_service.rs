//! Conversation fan-out
//!
//! Given a freshly persisted message and its conversation, resolves the
//! recipient set, creates the delivery records, and partitions recipients by
//! presence: reachable users get a live push through the registry, everyone
//! else gets a durable envelope queued for their next sync. Pushes and queue
//! writes are fire-and-forget; their failures never unwind the persisted
//! records.

use crate::error::{AppError, AppResult};
use crate::models::conversation::Conversation;
use crate::models::delivery::FanoutResult;
use crate::models::message::{Message, MessageEnvelope};
use crate::queue;
use crate::redis_client::RedisClient;
use crate::services::delivery_tracker::MessageDeliveryTracker;
use crate::services::presence::PresenceOracle;
use crate::store::DeliveryStore;
use crate::websocket::message_types::WsOutboundEvent;
use crate::websocket::ConnectionRegistry;

pub struct ConversationFanout;

impl ConversationFanout {
    /// Fan a saved message out to every participant except the sender.
    ///
    /// A direct conversation reduces to the same algorithm with one
    /// recipient. A presence-check failure downgrades that recipient to the
    /// queued partition rather than failing the send.
    pub async fn dispatch(
        deliveries: &DeliveryStore,
        presence: &dyn PresenceOracle,
        registry: &ConnectionRegistry,
        redis: Option<&RedisClient>,
        queue_cfg: &queue::QueueConfig,
        message: &Message,
        conversation: &Conversation,
    ) -> AppResult<FanoutResult> {
        let recipients = conversation.recipients_of(message.sender_id);
        if recipients.is_empty() {
            return Err(AppError::EmptyParticipantSet {
                conversation_id: conversation.id,
            });
        }

        MessageDeliveryTracker::initialize(deliveries, message, &recipients).await?;

        let payload = serde_json::to_value(WsOutboundEvent::NewMessage {
            message_id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            media_refs: message.media_refs.clone(),
            created_at: message.created_at.to_rfc3339(),
        })
        .map_err(|e| {
            tracing::error!(error = %e, "failed to serialize push payload");
            AppError::Internal
        })?;

        let envelope = MessageEnvelope::from_payload(message.conversation_id, payload)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build fanout envelope");
                AppError::Internal
            })?;

        let mut result = FanoutResult::default();
        for recipient_id in recipients {
            let reachable = match presence.is_reachable(recipient_id).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(
                        recipient_id = %recipient_id,
                        error = %e,
                        "presence check failed, treating recipient as unreachable"
                    );
                    false
                }
            };

            if reachable {
                match envelope.to_json() {
                    Ok(json) => registry.push_to_user(recipient_id, json).await,
                    Err(e) => tracing::warn!(error = %e, "failed to serialize live push"),
                }
                result.live_targets.push(recipient_id);
            } else {
                if let Some(client) = redis {
                    if let Err(e) =
                        queue::enqueue_envelope(client, queue_cfg, recipient_id, &envelope).await
                    {
                        tracing::warn!(
                            recipient_id = %recipient_id,
                            error = %e,
                            "failed to queue offline payload, recipient will reconcile from records"
                        );
                    }
                }
                result.queued_targets.push(recipient_id);
            }
        }

        tracing::info!(
            message_id = %message.id,
            conversation_id = %conversation.id,
            live = result.live_targets.len(),
            queued = result.queued_targets.len(),
            "message fanned out"
        );

        Ok(result)
    }
}
