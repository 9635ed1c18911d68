//! Conversation creation and participant management
//!
//! Thin policy layer over the conversation store: callers are identified
//! explicitly, and only members may change a conversation they belong to.
//! Membership changes never touch delivery records of already-sent messages;
//! each message's recipient set is fixed at fan-out time.

use crate::error::{AppError, AppResult};
use crate::models::conversation::Conversation;
use crate::store::ConversationStore;
use std::collections::BTreeSet;
use uuid::Uuid;

pub struct ConversationService;

impl ConversationService {
    /// Create (or return the existing) direct conversation between two users.
    pub async fn create_direct_conversation(
        conversations: &ConversationStore,
        initiator: Uuid,
        recipient: Uuid,
    ) -> AppResult<Conversation> {
        let conversation = conversations.create_direct(initiator, recipient).await?;
        tracing::info!(
            conversation_id = %conversation.id,
            "direct conversation ready"
        );
        Ok(conversation)
    }

    /// Create a group conversation with the creator as first participant.
    pub async fn create_group_conversation(
        conversations: &ConversationStore,
        creator: Uuid,
        participants: BTreeSet<Uuid>,
    ) -> AppResult<Conversation> {
        let conversation = conversations.create_group(creator, participants).await?;
        tracing::info!(
            conversation_id = %conversation.id,
            participants = conversation.participants.len(),
            "group conversation created"
        );
        Ok(conversation)
    }

    /// Add participants to a group; caller must already be a member.
    pub async fn add_participants(
        conversations: &ConversationStore,
        conversation_id: Uuid,
        caller_id: Uuid,
        new_participants: &[Uuid],
    ) -> AppResult<Vec<Uuid>> {
        if !conversations.is_member(conversation_id, caller_id).await? {
            return Err(AppError::NotConversationMember {
                conversation_id,
                user_id: caller_id,
            });
        }

        let added = conversations
            .add_participants(conversation_id, new_participants)
            .await?;
        if added.len() < new_participants.len() {
            tracing::warn!(
                conversation_id = %conversation_id,
                skipped = new_participants.len() - added.len(),
                "attempted to add existing participants"
            );
        }
        Ok(added)
    }

    /// Remove a participant; caller must be a member (users may remove
    /// themselves or others, role policy is the embedding host's concern).
    pub async fn remove_participant(
        conversations: &ConversationStore,
        conversation_id: Uuid,
        caller_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        if !conversations.is_member(conversation_id, caller_id).await? {
            return Err(AppError::NotConversationMember {
                conversation_id,
                user_id: caller_id,
            });
        }

        conversations
            .remove_participant(conversation_id, user_id)
            .await
    }
}
