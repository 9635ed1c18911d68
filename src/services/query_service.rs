//! Read-side projections over delivery records
//!
//! No mutation anywhere in this module; every operation is a scan-and-join
//! over the id-keyed stores and is safe under unbounded read concurrency.

use crate::error::{AppError, AppResult};
use crate::models::delivery::{DeliveryRecord, DeliveryState, DeliverySummary};
use crate::services::delivery_tracker::MessageDeliveryTracker;
use crate::store::{DeliveryStore, MessageStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One unread message as listed for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadMessageView {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub status: DeliveryState,
    pub created_at: DateTime<Utc>,
}

/// Unread tally for one conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationUnreadCount {
    pub conversation_id: Uuid,
    pub unread_count: usize,
}

pub struct DeliveryQueryService;

impl DeliveryQueryService {
    /// Unread messages addressed to `user_id` across all conversations,
    /// newest first, paged. Tombstoned messages are excluded.
    pub async fn unread_for_user(
        deliveries: &DeliveryStore,
        messages: &MessageStore,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> AppResult<Vec<UnreadMessageView>> {
        let mut views = Vec::new();
        for record in deliveries.for_recipient(user_id).await {
            if record.status >= DeliveryState::Read {
                continue;
            }
            let Some(message) = messages.get(record.message_id).await else {
                continue;
            };
            if message.is_deleted() {
                continue;
            }
            views.push(UnreadMessageView {
                message_id: message.id,
                conversation_id: message.conversation_id,
                sender_id: message.sender_id,
                status: record.status,
                created_at: message.created_at,
            });
        }

        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(views.into_iter().skip(offset).take(limit).collect())
    }

    /// Unread counts per conversation for `user_id`, sorted by conversation
    /// id for stable output. Conversations without unread messages are
    /// absent.
    pub async fn unread_count_per_conversation(
        deliveries: &DeliveryStore,
        messages: &MessageStore,
        user_id: Uuid,
    ) -> AppResult<Vec<ConversationUnreadCount>> {
        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for record in deliveries.for_recipient(user_id).await {
            if record.status >= DeliveryState::Read {
                continue;
            }
            let Some(message) = messages.get(record.message_id).await else {
                continue;
            };
            if message.is_deleted() {
                continue;
            }
            *counts.entry(message.conversation_id).or_default() += 1;
        }

        let mut out: Vec<ConversationUnreadCount> = counts
            .into_iter()
            .map(|(conversation_id, unread_count)| ConversationUnreadCount {
                conversation_id,
                unread_count,
            })
            .collect();
        out.sort_by_key(|c| c.conversation_id);
        Ok(out)
    }

    /// Delivery status of one message for one recipient
    pub async fn recipient_status(
        deliveries: &DeliveryStore,
        message_id: Uuid,
        recipient_id: Uuid,
    ) -> AppResult<DeliveryRecord> {
        deliveries
            .get(message_id, recipient_id)
            .await
            .ok_or(AppError::RecordNotFound {
                message_id,
                recipient_id,
            })
    }

    /// All per-recipient statuses for one message, newest transition first
    pub async fn message_statuses(
        deliveries: &DeliveryStore,
        message_id: Uuid,
    ) -> AppResult<Vec<DeliveryRecord>> {
        let mut records = deliveries.for_message(message_id).await;
        records.sort_by(|a, b| b.status_timestamp.cmp(&a.status_timestamp));
        Ok(records)
    }

    /// Aggregate delivery progress for one message
    pub async fn summarize(
        deliveries: &DeliveryStore,
        message_id: Uuid,
    ) -> AppResult<DeliverySummary> {
        MessageDeliveryTracker::summarize(deliveries, message_id).await
    }
}
