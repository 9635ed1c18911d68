//! Arena storage for delivery tracking rows
//!
//! Rows are keyed by (message_id, recipient_id) with the map key doubling as
//! the uniqueness constraint. The store's write lock is the serialization
//! point required by the transition contract: record creation is an
//! all-or-nothing batch insert, and advances are compare-and-swap on the
//! current rank under the same lock, so out-of-order acknowledgements cannot
//! interleave into a corrupted state.

use crate::error::{AppError, AppResult};
use crate::models::delivery::{DeliveryRecord, DeliveryState};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Outcome of an atomic compare-and-advance
#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    /// The record moved to the target state
    Applied(DeliveryRecord),
    /// The record was already at the target rank or past it; unchanged
    AlreadyPast(DeliveryRecord),
}

impl AdvanceOutcome {
    pub fn record(&self) -> &DeliveryRecord {
        match self {
            AdvanceOutcome::Applied(r) | AdvanceOutcome::AlreadyPast(r) => r,
        }
    }

    pub fn applied(&self) -> bool {
        matches!(self, AdvanceOutcome::Applied(_))
    }
}

#[derive(Default, Clone)]
pub struct DeliveryStore {
    inner: Arc<RwLock<HashMap<(Uuid, Uuid), DeliveryRecord>>>,
}

impl DeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one record per recipient, all at Sent, as a single batch.
    /// Fails without inserting anything if any (message, recipient) pair
    /// already has a row.
    pub async fn insert_batch(
        &self,
        message_id: Uuid,
        recipients: &[Uuid],
    ) -> AppResult<Vec<DeliveryRecord>> {
        let now = Utc::now();
        let mut guard = self.inner.write().await;

        for recipient_id in recipients {
            if guard.contains_key(&(message_id, *recipient_id)) {
                return Err(AppError::Conflict(format!(
                    "delivery record already exists for message {} and recipient {}",
                    message_id, recipient_id
                )));
            }
        }

        let mut created = Vec::with_capacity(recipients.len());
        for recipient_id in recipients {
            let record = DeliveryRecord::new(message_id, *recipient_id, now);
            guard.insert((message_id, *recipient_id), record.clone());
            created.push(record);
        }

        Ok(created)
    }

    /// Atomically advance the record for (message, recipient) to `target`.
    /// Lower-or-equal targets leave the record untouched and report
    /// `AlreadyPast`; a missing record is a caller error.
    pub async fn compare_and_advance(
        &self,
        message_id: Uuid,
        recipient_id: Uuid,
        target: DeliveryState,
    ) -> AppResult<AdvanceOutcome> {
        let mut guard = self.inner.write().await;
        let record = guard
            .get_mut(&(message_id, recipient_id))
            .ok_or(AppError::RecordNotFound {
                message_id,
                recipient_id,
            })?;

        if record.advance(target, Utc::now()) {
            Ok(AdvanceOutcome::Applied(record.clone()))
        } else {
            Ok(AdvanceOutcome::AlreadyPast(record.clone()))
        }
    }

    pub async fn get(&self, message_id: Uuid, recipient_id: Uuid) -> Option<DeliveryRecord> {
        let guard = self.inner.read().await;
        guard.get(&(message_id, recipient_id)).cloned()
    }

    /// All tracking rows for one message
    pub async fn for_message(&self, message_id: Uuid) -> Vec<DeliveryRecord> {
        let guard = self.inner.read().await;
        guard
            .values()
            .filter(|r| r.message_id == message_id)
            .cloned()
            .collect()
    }

    /// All tracking rows addressed to one recipient
    pub async fn for_recipient(&self, recipient_id: Uuid) -> Vec<DeliveryRecord> {
        let guard = self.inner.read().await;
        guard
            .values()
            .filter(|r| r.recipient_id == recipient_id)
            .cloned()
            .collect()
    }

    /// Retention hook: remove rows created before `cutoff`. Invoked by the
    /// external cleanup collaborator; the core never deletes rows itself.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, r| r.created_at >= cutoff);
        before - guard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_batch_is_all_or_nothing() {
        let store = DeliveryStore::new();
        let message_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.insert_batch(message_id, &[a]).await.unwrap();

        // Batch containing an existing pair fails and inserts nothing
        let err = store.insert_batch(message_id, &[b, a]).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store.get(message_id, b).await.is_none());
    }

    #[tokio::test]
    async fn test_compare_and_advance_missing_record() {
        let store = DeliveryStore::new();
        let err = store
            .compare_and_advance(Uuid::new_v4(), Uuid::new_v4(), DeliveryState::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RecordNotFound { .. }));
    }

    #[tokio::test]
    async fn test_purge_respects_cutoff() {
        let store = DeliveryStore::new();
        let message_id = Uuid::new_v4();
        store
            .insert_batch(message_id, &[Uuid::new_v4()])
            .await
            .unwrap();

        // Everything in the store is newer than a cutoff in the past
        assert_eq!(
            store
                .purge_older_than(Utc::now() - chrono::Duration::hours(1))
                .await,
            0
        );
        assert_eq!(
            store
                .purge_older_than(Utc::now() + chrono::Duration::hours(1))
                .await,
            1
        );
        assert!(store.for_message(message_id).await.is_empty());
    }
}
