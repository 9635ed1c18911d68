//! Arena storage for messages, keyed by message id

use crate::error::{AppError, AppResult};
use crate::models::message::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default, Clone)]
pub struct MessageStore {
    inner: Arc<RwLock<HashMap<Uuid, Message>>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, message: Message) -> AppResult<Message> {
        let mut guard = self.inner.write().await;
        if guard.contains_key(&message.id) {
            return Err(AppError::Conflict(format!(
                "message {} already exists",
                message.id
            )));
        }
        guard.insert(message.id, message.clone());
        Ok(message)
    }

    pub async fn get(&self, message_id: Uuid) -> Option<Message> {
        let guard = self.inner.read().await;
        guard.get(&message_id).cloned()
    }

    /// Apply a mutation under the store lock. The closure performs its own
    /// permission checks and returns the updated message.
    pub async fn update<F>(&self, message_id: Uuid, f: F) -> AppResult<Message>
    where
        F: FnOnce(&mut Message) -> AppResult<()>,
    {
        let mut guard = self.inner.write().await;
        let message = guard
            .get_mut(&message_id)
            .ok_or(AppError::MessageNotFound { message_id })?;
        f(message)?;
        Ok(message.clone())
    }

    /// Messages of one conversation, tombstones excluded, oldest first.
    pub async fn history(&self, conversation_id: Uuid, limit: usize) -> Vec<Message> {
        let guard = self.inner.read().await;
        let mut out: Vec<Message> = guard
            .values()
            .filter(|m| m.conversation_id == conversation_id && !m.is_deleted())
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        out.truncate(limit);
        out
    }
}
