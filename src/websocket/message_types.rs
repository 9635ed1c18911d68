use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound WebSocket events from client to server
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    /// Acknowledge a message's delivery progress. `status` carries the target
    /// state as a string ("received", "delivered", "read").
    #[serde(rename = "ack")]
    Ack {
        message_id: Uuid,
        user_id: Uuid,
        status: String,
    },

    /// Request the payloads queued while this user was offline
    #[serde(rename = "sync")]
    Sync { user_id: Uuid },
}

/// Outbound WebSocket events from server to client
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    /// A new message addressed to the receiving user
    #[serde(rename = "message")]
    NewMessage {
        message_id: Uuid,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media_refs: Vec<Uuid>,
        created_at: String,
    },

    /// A recipient's delivery state changed; pushed to the message sender
    #[serde(rename = "delivery_update")]
    DeliveryUpdate {
        message_id: Uuid,
        recipient_id: Uuid,
        status: String,
        status_timestamp: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_event_roundtrip_tag() {
        let raw = r#"{"type":"ack","message_id":"7f0c0e67-7f3b-4a0e-9e4f-47c5a1d2b3c4","user_id":"2b0c0e67-7f3b-4a0e-9e4f-47c5a1d2b3c4","status":"read"}"#;
        let event: WsInboundEvent = serde_json::from_str(raw).unwrap();
        match event {
            WsInboundEvent::Ack { status, .. } => assert_eq!(status, "read"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_delivery_update_serializes_tag() {
        let event = WsOutboundEvent::DeliveryUpdate {
            message_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            status: "delivered".to_string(),
            status_timestamp: "2026-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"delivery_update""#));
    }
}
