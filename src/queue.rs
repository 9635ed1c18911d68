//! Redis Streams-based offline delivery queues
//!
//! One stream per recipient. Fan-out appends an envelope for every
//! unreachable recipient; the recipient drains the stream on next sync with
//! `XREAD` starting after its last seen entry. Streams are trimmed
//! approximately, both by length on write and by age on maintenance, so a
//! recipient that never returns cannot grow a stream without bound.

use crate::models::message::MessageEnvelope;
use crate::redis_client::RedisClient as Client;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// A queued stream entry waiting for its recipient
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    /// Redis stream entry ID (timestamp-sequence)
    pub id: String,
    pub conversation_id: Uuid,
    pub payload: String,
}

/// Configuration for the per-recipient queues
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum age of queued entries (in ms) before maintenance trims them
    pub max_age_ms: u64,
    /// Batch size for reading queued entries
    pub batch_size: usize,
    /// Approximate per-recipient stream length cap
    pub max_len: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_age_ms: 7 * 24 * 60 * 60 * 1000, // 7 days
            batch_size: 100,
            max_len: 1000,
        }
    }
}

/// Stream key naming convention
fn queue_key(recipient_id: Uuid) -> String {
    format!("queue:recipient:{}", recipient_id)
}

/// Global counter for probabilistic stream trimming.
/// Only trim every 100 enqueues to avoid per-write overhead.
static TRIM_COUNTER: AtomicU64 = AtomicU64::new(0);
const TRIM_INTERVAL: u64 = 100;

/// Append an envelope to a recipient's queue
pub async fn enqueue_envelope(
    client: &Client,
    cfg: &QueueConfig,
    recipient_id: Uuid,
    envelope: &MessageEnvelope,
) -> redis::RedisResult<String> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let key = queue_key(recipient_id);
    let envelope_json = envelope.to_json().map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "serialize message envelope",
            e.to_string(),
        ))
    })?;

    let conversation_id = envelope.conversation_id.to_string();
    let timestamp = chrono::Utc::now().timestamp_millis().to_string();
    let entry_id: String = conn
        .xadd::<_, _, _, _, String>(
            &key,
            "*", // Auto-generate ID with current timestamp
            &[
                ("conversation_id", conversation_id.as_str()),
                ("payload", envelope_json.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
        )
        .await?;

    // Probabilistic trimming: cap stream length without paying XTRIM on
    // every enqueue. Spawned so the send path never blocks on maintenance.
    let counter = TRIM_COUNTER.fetch_add(1, Ordering::Relaxed);
    if counter % TRIM_INTERVAL == 0 {
        let key_clone = key.clone();
        let redis_client = client.clone();
        let max_len = cfg.max_len;

        tokio::spawn(async move {
            let mut trim_conn = match redis_client.get_multiplexed_async_connection().await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Failed to connect for queue trim: {:?}", e);
                    return;
                }
            };

            if let Err(e) = redis::cmd("XTRIM")
                .arg(&key_clone)
                .arg("MAXLEN")
                .arg("~") // Approximate trimming for performance
                .arg(max_len)
                .query_async::<_, ()>(&mut trim_conn)
                .await
            {
                tracing::warn!("Failed to trim queue {}: {:?}", key_clone, e);
            }
        });
    }

    Ok(entry_id)
}

/// Read queued entries for a recipient, starting after `last_id`
pub async fn read_queued(
    client: &Client,
    cfg: &QueueConfig,
    recipient_id: Uuid,
    last_id: &str,
) -> redis::RedisResult<Vec<QueuedMessage>> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let key = queue_key(recipient_id);

    let entries: Vec<(String, HashMap<String, String>)> = redis::cmd("XREAD")
        .arg("COUNT")
        .arg(cfg.batch_size)
        .arg("STREAMS")
        .arg(&key)
        .arg(if last_id.is_empty() { "0" } else { last_id })
        .query_async(&mut conn)
        .await?;

    let mut results = Vec::new();

    for (stream_id, fields) in entries {
        let conversation_id_str = fields.get("conversation_id").ok_or_else(|| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "missing conversation_id"))
        })?;

        let conversation_id = match Uuid::parse_str(conversation_id_str) {
            Ok(id) => id,
            Err(_) => {
                tracing::warn!(
                    "Invalid conversation_id in queue entry: {}",
                    conversation_id_str
                );
                continue;
            }
        };

        let payload = match fields.get("payload").cloned() {
            Some(p) => p,
            None => {
                tracing::warn!("Queue entry {} missing payload, skipping", stream_id);
                continue;
            }
        };

        results.push(QueuedMessage {
            id: stream_id,
            conversation_id,
            payload,
        });
    }

    Ok(results)
}

/// Trim expired entries from a recipient's queue (maintenance)
///
/// In Redis Streams the entry ID format is timestamp-sequence; XTRIM with
/// MINID drops everything older than the age cutoff.
pub async fn trim_expired(
    client: &Client,
    cfg: &QueueConfig,
    recipient_id: Uuid,
) -> redis::RedisResult<()> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let key = queue_key(recipient_id);

    let now_ms = chrono::Utc::now().timestamp_millis();
    let cutoff_ms = now_ms - cfg.max_age_ms as i64;

    let _: Result<(), _> = redis::cmd("XTRIM")
        .arg(&key)
        .arg("MINID")
        .arg("~") // Approximate trimming for performance
        .arg(format!("{}-0", cutoff_ms))
        .query_async(&mut conn)
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_key_convention() {
        let id = Uuid::nil();
        assert_eq!(
            queue_key(id),
            "queue:recipient:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_queue_config_defaults() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.max_age_ms, 7 * 24 * 60 * 60 * 1000);
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.max_len, 1000);
    }
}
