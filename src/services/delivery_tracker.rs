//! Per-message delivery tracking
//!
//! Owns the set of delivery records for one message: creates them at send
//! time, applies acknowledgement transitions, and computes aggregates. The
//! public surface only ever advances records; there is no arbitrary state
//! setter, so a regression can only arrive as an acknowledgement targeting
//! `sent`, which is rejected.

use crate::error::{AppError, AppResult};
use crate::models::delivery::{DeliveryRecord, DeliveryState, DeliverySummary};
use crate::models::message::Message;
use crate::store::{AdvanceOutcome, DeliveryStore};
use uuid::Uuid;

pub struct MessageDeliveryTracker;

impl MessageDeliveryTracker {
    /// Create one tracking record per recipient, all at `sent`.
    ///
    /// The recipient set must already exclude the sender; a sender showing up
    /// here indicates a caller bug and fails before anything is inserted.
    pub async fn initialize(
        deliveries: &DeliveryStore,
        message: &Message,
        recipients: &[Uuid],
    ) -> AppResult<Vec<DeliveryRecord>> {
        if recipients.contains(&message.sender_id) {
            return Err(AppError::DuplicateRecipient {
                message_id: message.id,
                user_id: message.sender_id,
            });
        }

        let created = deliveries.insert_batch(message.id, recipients).await?;
        tracing::debug!(
            message_id = %message.id,
            recipients = created.len(),
            "created delivery records"
        );
        Ok(created)
    }

    /// Apply an acknowledgement targeting `target`.
    ///
    /// `sent` is never a legal acknowledgement target; asking for it is an
    /// explicit regression request and fails loudly. Any other target goes
    /// through the atomic compare-and-advance: strictly higher rank applies,
    /// lower or equal rank is a silent no-op.
    pub async fn apply_ack(
        deliveries: &DeliveryStore,
        message_id: Uuid,
        recipient_id: Uuid,
        target: DeliveryState,
    ) -> AppResult<AdvanceOutcome> {
        if !target.is_ack_target() {
            let current = deliveries
                .get(message_id, recipient_id)
                .await
                .ok_or(AppError::RecordNotFound {
                    message_id,
                    recipient_id,
                })?;
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        deliveries
            .compare_and_advance(message_id, recipient_id, target)
            .await
    }

    pub async fn mark_received(
        deliveries: &DeliveryStore,
        message_id: Uuid,
        recipient_id: Uuid,
    ) -> AppResult<AdvanceOutcome> {
        Self::apply_ack(deliveries, message_id, recipient_id, DeliveryState::Received).await
    }

    pub async fn mark_delivered(
        deliveries: &DeliveryStore,
        message_id: Uuid,
        recipient_id: Uuid,
    ) -> AppResult<AdvanceOutcome> {
        Self::apply_ack(deliveries, message_id, recipient_id, DeliveryState::Delivered).await
    }

    pub async fn mark_read(
        deliveries: &DeliveryStore,
        message_id: Uuid,
        recipient_id: Uuid,
    ) -> AppResult<AdvanceOutcome> {
        Self::apply_ack(deliveries, message_id, recipient_id, DeliveryState::Read).await
    }

    /// Aggregate delivery progress for one message; a pure read.
    pub async fn summarize(
        deliveries: &DeliveryStore,
        message_id: Uuid,
    ) -> AppResult<DeliverySummary> {
        let records = deliveries.for_message(message_id).await;

        let total_recipients = records.len();
        let read_count = records
            .iter()
            .filter(|r| r.status == DeliveryState::Read)
            .count();
        let delivered_count = records
            .iter()
            .filter(|r| r.status >= DeliveryState::Delivered)
            .count();
        let mut unread_recipients: Vec<Uuid> = records
            .iter()
            .filter(|r| r.status < DeliveryState::Read)
            .map(|r| r.recipient_id)
            .collect();
        unread_recipients.sort();

        Ok(DeliverySummary {
            total_recipients,
            read_count,
            delivered_count,
            unread_recipients,
        })
    }
}
