use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Conversation kind: two-party direct chat or multi-party group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
}

/// A conversation and its current participant set.
/// The participant set is consulted at fan-out time; membership changes only
/// affect messages sent afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub kind: ConversationKind,
    pub participants: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(kind: ConversationKind, participants: BTreeSet<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            participants,
            created_at: Utc::now(),
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }

    /// Addressable recipients for a message from `sender_id`:
    /// every participant except the sender.
    pub fn recipients_of(&self, sender_id: Uuid) -> Vec<Uuid> {
        self.participants
            .iter()
            .copied()
            .filter(|id| *id != sender_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipients_exclude_sender() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let conversation =
            Conversation::new(ConversationKind::Group, BTreeSet::from([a, b, c]));

        let recipients = conversation.recipients_of(a);
        assert_eq!(recipients.len(), 2);
        assert!(!recipients.contains(&a));
        assert!(recipients.contains(&b));
        assert!(recipients.contains(&c));
    }

    #[test]
    fn test_direct_conversation_single_recipient() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conversation = Conversation::new(ConversationKind::Direct, BTreeSet::from([a, b]));

        assert_eq!(conversation.recipients_of(a), vec![b]);
    }
}
