//! Delivery state lifecycle and per-recipient tracking records
//!
//! States have a strict rank order: Sent < Received < Delivered < Read.
//! A record only ever moves to a strictly higher rank; lower-or-equal targets
//! are silent no-ops so duplicate or out-of-order acknowledgements cannot
//! regress state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Per-recipient delivery lifecycle state with strict rank ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    /// Record created at message persistence time
    Sent = 1,
    /// Message received by the recipient's client
    Received = 2,
    /// Message persisted on the recipient's device
    Delivered = 3,
    /// Message read by the recipient (terminal)
    Read = 4,
}

impl DeliveryState {
    /// Strict rank used for monotonic-advance comparison
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Parse state from storage string
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "sent" => Some(Self::Sent),
            "received" => Some(Self::Received),
            "delivered" => Some(Self::Delivered),
            "read" => Some(Self::Read),
            _ => None,
        }
    }

    /// Convert state to storage string
    pub fn to_db(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }

    /// Whether a record at `self` may advance to `target`.
    /// Equal or lower rank never advances; skipping ranks is allowed.
    pub fn can_advance_to(&self, target: DeliveryState) -> bool {
        target.rank() > self.rank()
    }

    /// Whether this state is a legal acknowledgement target.
    /// `Sent` is assigned at record creation and is never acknowledged-to;
    /// a request for it is a regression attempt.
    pub fn is_ack_target(&self) -> bool {
        *self > DeliveryState::Sent
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db())
    }
}

/// Parse from string (for API requests)
impl std::str::FromStr for DeliveryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db(s).ok_or_else(|| format!("Invalid delivery state: {}", s))
    }
}

/// One tracking row per (message, recipient) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub message_id: Uuid,
    pub recipient_id: Uuid,
    pub status: DeliveryState,
    /// Timestamp of the last applied transition
    pub status_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn new(message_id: Uuid, recipient_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            message_id,
            recipient_id,
            status: DeliveryState::Sent,
            status_timestamp: now,
            created_at: now,
        }
    }

    /// Advance to `target` if it is strictly higher ranked.
    /// Returns true when the record changed; a lower-or-equal target leaves
    /// the record (including its timestamp) untouched.
    pub fn advance(&mut self, target: DeliveryState, now: DateTime<Utc>) -> bool {
        if self.status.can_advance_to(target) {
            self.status = target;
            self.status_timestamp = now;
            true
        } else {
            false
        }
    }
}

/// Aggregated delivery progress for one message, computed on demand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySummary {
    pub total_recipients: usize,
    pub read_count: usize,
    /// Recipients at Delivered or later
    pub delivered_count: usize,
    /// Recipients strictly below Read
    pub unread_recipients: Vec<Uuid>,
}

/// Partition of a message's recipients produced by fan-out
#[derive(Debug, Clone, Default)]
pub struct FanoutResult {
    /// Recipients with a live connection; a push was attempted for each
    pub live_targets: Vec<Uuid>,
    /// Recipients without a live connection; they pull on next sync
    pub queued_targets: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering() {
        assert!(DeliveryState::Sent < DeliveryState::Received);
        assert!(DeliveryState::Received < DeliveryState::Delivered);
        assert!(DeliveryState::Delivered < DeliveryState::Read);
    }

    #[test]
    fn test_rank() {
        assert_eq!(DeliveryState::Sent.rank(), 1);
        assert_eq!(DeliveryState::Received.rank(), 2);
        assert_eq!(DeliveryState::Delivered.rank(), 3);
        assert_eq!(DeliveryState::Read.rank(), 4);
    }

    #[test]
    fn test_can_advance_to() {
        let sent = DeliveryState::Sent;
        let read = DeliveryState::Read;

        assert!(sent.can_advance_to(DeliveryState::Received));
        assert!(sent.can_advance_to(DeliveryState::Read)); // skipping ranks is allowed
        assert!(!read.can_advance_to(DeliveryState::Read)); // equal rank never advances
        assert!(!read.can_advance_to(DeliveryState::Delivered));
        assert!(!sent.can_advance_to(DeliveryState::Sent));
    }

    #[test]
    fn test_is_ack_target() {
        assert!(!DeliveryState::Sent.is_ack_target());
        assert!(DeliveryState::Received.is_ack_target());
        assert!(DeliveryState::Delivered.is_ack_target());
        assert!(DeliveryState::Read.is_ack_target());
    }

    #[test]
    fn test_from_db() {
        assert_eq!(DeliveryState::from_db("sent"), Some(DeliveryState::Sent));
        assert_eq!(
            DeliveryState::from_db("received"),
            Some(DeliveryState::Received)
        );
        assert_eq!(
            DeliveryState::from_db("delivered"),
            Some(DeliveryState::Delivered)
        );
        assert_eq!(DeliveryState::from_db("read"), Some(DeliveryState::Read));
        assert_eq!(DeliveryState::from_db("unread"), None);
    }

    #[test]
    fn test_to_db() {
        assert_eq!(DeliveryState::Sent.to_db(), "sent");
        assert_eq!(DeliveryState::Received.to_db(), "received");
        assert_eq!(DeliveryState::Delivered.to_db(), "delivered");
        assert_eq!(DeliveryState::Read.to_db(), "read");
    }

    #[test]
    fn test_record_advance_is_monotonic() {
        let now = Utc::now();
        let mut record = DeliveryRecord::new(Uuid::new_v4(), Uuid::new_v4(), now);

        assert!(record.advance(DeliveryState::Read, Utc::now()));
        let read_at = record.status_timestamp;

        // A late "received" ack must not regress state or touch the timestamp
        assert!(!record.advance(DeliveryState::Received, Utc::now()));
        assert_eq!(record.status, DeliveryState::Read);
        assert_eq!(record.status_timestamp, read_at);
    }

    #[test]
    fn test_record_advance_idempotent() {
        let now = Utc::now();
        let mut record = DeliveryRecord::new(Uuid::new_v4(), Uuid::new_v4(), now);

        assert!(record.advance(DeliveryState::Delivered, Utc::now()));
        let first = record.status_timestamp;

        assert!(!record.advance(DeliveryState::Delivered, Utc::now()));
        assert_eq!(record.status_timestamp, first);
    }
}
