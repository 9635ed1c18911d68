//! Arena storage for conversations and their participant sets

use crate::error::{AppError, AppResult};
use crate::models::conversation::{Conversation, ConversationKind};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default, Clone)]
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a direct (1:1) conversation between two users.
    /// Returns the existing conversation when the pair already has one.
    pub async fn create_direct(&self, initiator: Uuid, recipient: Uuid) -> AppResult<Conversation> {
        if initiator == recipient {
            return Err(AppError::BadRequest(
                "direct conversation requires two distinct users".into(),
            ));
        }

        let mut guard = self.inner.write().await;

        if let Some(existing) = guard.values().find(|c| {
            c.kind == ConversationKind::Direct
                && c.participants.contains(&initiator)
                && c.participants.contains(&recipient)
        }) {
            return Ok(existing.clone());
        }

        let conversation = Conversation::new(
            ConversationKind::Direct,
            BTreeSet::from([initiator, recipient]),
        );
        guard.insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    /// Create a group conversation. The creator is always a participant.
    pub async fn create_group(
        &self,
        creator: Uuid,
        participants: BTreeSet<Uuid>,
    ) -> AppResult<Conversation> {
        let mut members = participants;
        members.insert(creator);

        let conversation = Conversation::new(ConversationKind::Group, members);
        let mut guard = self.inner.write().await;
        guard.insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    pub async fn get(&self, conversation_id: Uuid) -> Option<Conversation> {
        let guard = self.inner.read().await;
        guard.get(&conversation_id).cloned()
    }

    pub async fn is_member(&self, conversation_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let guard = self.inner.read().await;
        let conversation =
            guard
                .get(&conversation_id)
                .ok_or(AppError::ConversationNotFound { conversation_id })?;
        Ok(conversation.is_participant(user_id))
    }

    /// Add participants to a group. Already-present users are skipped.
    /// Returns the users actually added.
    pub async fn add_participants(
        &self,
        conversation_id: Uuid,
        new_participants: &[Uuid],
    ) -> AppResult<Vec<Uuid>> {
        let mut guard = self.inner.write().await;
        let conversation =
            guard
                .get_mut(&conversation_id)
                .ok_or(AppError::ConversationNotFound { conversation_id })?;

        if conversation.kind != ConversationKind::Group {
            return Err(AppError::BadRequest(
                "participants can only be added to group conversations".into(),
            ));
        }

        let mut added = Vec::new();
        for user_id in new_participants {
            if conversation.participants.insert(*user_id) {
                added.push(*user_id);
            }
        }
        Ok(added)
    }

    pub async fn remove_participant(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let mut guard = self.inner.write().await;
        let conversation =
            guard
                .get_mut(&conversation_id)
                .ok_or(AppError::ConversationNotFound { conversation_id })?;

        if !conversation.participants.remove(&user_id) {
            return Err(AppError::NotConversationMember {
                conversation_id,
                user_id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_direct_dedupes_existing_pair() {
        let store = ConversationStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = store.create_direct(a, b).await.unwrap();
        let second = store.create_direct(b, a).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_create_direct_rejects_self() {
        let store = ConversationStore::new();
        let a = Uuid::new_v4();
        assert!(store.create_direct(a, a).await.is_err());
    }

    #[tokio::test]
    async fn test_group_membership_changes() {
        let store = ConversationStore::new();
        let creator = Uuid::new_v4();
        let member = Uuid::new_v4();

        let group = store
            .create_group(creator, BTreeSet::from([member]))
            .await
            .unwrap();
        assert_eq!(group.participants.len(), 2);

        let newcomer = Uuid::new_v4();
        // Adding an existing member is a skip, not an error
        let added = store
            .add_participants(group.id, &[member, newcomer])
            .await
            .unwrap();
        assert_eq!(added, vec![newcomer]);

        store.remove_participant(group.id, member).await.unwrap();
        let err = store
            .remove_participant(group.id, member)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotConversationMember { .. }));
    }
}
