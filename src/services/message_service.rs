//! Message send, edit and delete orchestration
//!
//! The send path validates membership and content, persists the message, and
//! hands off to fan-out. Edits and deletes touch the message only; delivery
//! tracking records are never altered by either.

use crate::error::{AppError, AppResult};
use crate::models::delivery::FanoutResult;
use crate::models::message::Message;
use crate::queue;
use crate::redis_client::RedisClient;
use crate::services::fanout_service::ConversationFanout;
use crate::services::presence::PresenceOracle;
use crate::store::{ConversationStore, DeliveryStore, MessageStore};
use chrono::Utc;
use uuid::Uuid;

pub struct MessageService;

impl MessageService {
    /// Persist a message and fan it out to the conversation's recipients.
    #[allow(clippy::too_many_arguments)]
    pub async fn send_message(
        conversations: &ConversationStore,
        messages: &MessageStore,
        deliveries: &DeliveryStore,
        presence: &dyn PresenceOracle,
        registry: &crate::websocket::ConnectionRegistry,
        redis: Option<&RedisClient>,
        queue_cfg: &queue::QueueConfig,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
        media_refs: Vec<Uuid>,
    ) -> AppResult<(Message, FanoutResult)> {
        let conversation = conversations
            .get(conversation_id)
            .await
            .ok_or(AppError::ConversationNotFound { conversation_id })?;

        if !conversation.is_participant(sender_id) {
            return Err(AppError::NotConversationMember {
                conversation_id,
                user_id: sender_id,
            });
        }

        if content.is_empty() && media_refs.is_empty() {
            return Err(AppError::BadRequest(
                "message needs content or media".into(),
            ));
        }

        let message = messages
            .insert(Message::new(
                conversation_id,
                sender_id,
                content.to_string(),
                media_refs,
            ))
            .await?;

        tracing::info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            "message persisted"
        );

        let fanout = ConversationFanout::dispatch(
            deliveries,
            presence,
            registry,
            redis,
            queue_cfg,
            &message,
            &conversation,
        )
        .await?;

        Ok((message, fanout))
    }

    /// Replace a message's content. Sender only; stamps `edited_at` and
    /// leaves delivery tracking untouched.
    pub async fn edit_message(
        messages: &MessageStore,
        message_id: Uuid,
        editor_id: Uuid,
        new_content: &str,
    ) -> AppResult<Message> {
        if new_content.is_empty() {
            return Err(AppError::BadRequest("message content cannot be empty".into()));
        }

        messages
            .update(message_id, |message| {
                if message.sender_id != editor_id {
                    return Err(AppError::Forbidden);
                }
                if message.is_deleted() {
                    return Err(AppError::MessageNotFound { message_id });
                }
                message.content = new_content.to_string();
                message.edited_at = Some(Utc::now());
                Ok(())
            })
            .await
    }

    /// Tombstone a message. Sender only. Tracking rows survive until the
    /// retention collaborator purges them.
    pub async fn soft_delete_message(
        messages: &MessageStore,
        message_id: Uuid,
        caller_id: Uuid,
    ) -> AppResult<()> {
        messages
            .update(message_id, |message| {
                if message.sender_id != caller_id {
                    return Err(AppError::Forbidden);
                }
                message.deleted_at = Some(Utc::now());
                Ok(())
            })
            .await?;

        tracing::info!(message_id = %message_id, "message tombstoned");
        Ok(())
    }

    /// Conversation history for a member, tombstones excluded, oldest first.
    pub async fn message_history(
        conversations: &ConversationStore,
        messages: &MessageStore,
        conversation_id: Uuid,
        caller_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<Message>> {
        if !conversations.is_member(conversation_id, caller_id).await? {
            return Err(AppError::NotConversationMember {
                conversation_id,
                user_id: caller_id,
            });
        }
        Ok(messages.history(conversation_id, limit).await)
    }
}
