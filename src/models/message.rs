use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// A persisted conversation message.
/// Content is immutable except through the explicit edit operation, which
/// stamps `edited_at` and leaves delivery tracking untouched. Deletion is a
/// tombstone (`deleted_at`); tracking rows survive until retention cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    /// References to media objects stored by the media collaborator
    pub media_refs: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
        media_refs: Vec<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content,
            media_refs,
            created_at: Utc::now(),
            edited_at: None,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Envelope used for live push fanout and Redis Streams queueing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    pub conversation_id: Uuid,
    #[serde(flatten)]
    pub data: Map<String, JsonValue>,
}

impl MessageEnvelope {
    /// Build an envelope from a JSON object representing the event payload.
    /// Automatically stamps `conversation_id` and ensures `timestamp` exists.
    pub fn from_payload(conversation_id: Uuid, payload: JsonValue) -> Result<Self, String> {
        let mut data = payload
            .as_object()
            .cloned()
            .ok_or_else(|| "event payload must be a JSON object".to_string())?;

        data.remove("stream_id");
        data.remove("conversation_id");

        // Ensure timestamp exists so downstream consumers have ordering context.
        if !data.contains_key("timestamp") {
            data.insert(
                "timestamp".to_string(),
                JsonValue::String(Utc::now().to_rfc3339()),
            );
        }

        Ok(Self {
            stream_id: None,
            conversation_id,
            data,
        })
    }

    /// Parse an envelope from the serialized JSON stored in Redis Streams.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<MessageEnvelope>(payload)
    }

    /// Convert envelope to JSON string for storage / push.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Set the stream identifier (after persisting to Redis Streams).
    pub fn set_stream_id(&mut self, id: String) {
        self.stream_id = Some(id.clone());
        self.data
            .insert("stream_id".to_string(), JsonValue::String(id));
    }

    /// Retrieve the event type (if present).
    pub fn event_type(&self) -> Option<&str> {
        self.data.get("type").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_from_payload_stamps_timestamp() {
        let conversation_id = Uuid::new_v4();
        let envelope = MessageEnvelope::from_payload(
            conversation_id,
            json!({"type": "message", "content": "hi"}),
        )
        .unwrap();

        assert_eq!(envelope.conversation_id, conversation_id);
        assert_eq!(envelope.event_type(), Some("message"));
        assert!(envelope.data.contains_key("timestamp"));
    }

    #[test]
    fn test_envelope_rejects_non_object_payload() {
        assert!(MessageEnvelope::from_payload(Uuid::new_v4(), json!("just a string")).is_err());
    }

    #[test]
    fn test_envelope_strips_reserved_fields() {
        let envelope = MessageEnvelope::from_payload(
            Uuid::new_v4(),
            json!({"type": "message", "stream_id": "1-1", "conversation_id": "bogus"}),
        )
        .unwrap();

        assert!(envelope.stream_id.is_none());
        assert!(!envelope.data.contains_key("conversation_id"));
    }
}
