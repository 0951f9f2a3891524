//! Queue message envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Message priority.
///
/// Stored on every message but the queue does not reorder by it; delivery is
/// strictly insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// Default retry budget carried by new messages.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A typed message travelling through a [`MessageQueue`](crate::MessageQueue).
///
/// `message_type` is a free-form tag used to pick a handler; `payload` is
/// opaque to the queue. `retry_count`, `max_retries` and `process_after` are
/// carried for producers that want them but no consumer acts on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub message_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: MessagePriority,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl QueueMessage {
    pub fn new(message_type: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_type: message_type.into(),
            payload,
            created_at: Utc::now(),
            priority: MessagePriority::default(),
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            process_after: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_process_after(mut self, at: DateTime<Utc>) -> Self {
        self.process_after = Some(at);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// True while the retry budget is not exhausted.
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_ordering() {
        assert!(MessagePriority::Low < MessagePriority::Normal);
        assert!(MessagePriority::Normal < MessagePriority::High);
        assert!(MessagePriority::High < MessagePriority::Critical);
        assert_eq!(MessagePriority::default(), MessagePriority::Normal);
    }

    #[test]
    fn test_new_message_defaults() {
        let message = QueueMessage::new("Notification", json!({ "title": "hello" }));

        assert_eq!(message.message_type, "Notification");
        assert_eq!(message.priority, MessagePriority::Normal);
        assert_eq!(message.retry_count, 0);
        assert_eq!(message.max_retries, 3);
        assert!(message.process_after.is_none());
        assert!(message.metadata.is_empty());
        assert!(message.can_retry());
    }

    #[test]
    fn test_serialized_shape_uses_type_key() {
        let message = QueueMessage::new("ScheduledTask", json!({}))
            .with_priority(MessagePriority::High)
            .with_metadata("origin", json!("test"));
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "ScheduledTask");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["metadata"]["origin"], "test");
        assert!(value.get("process_after").is_none());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let message: QueueMessage = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "type": "Notification",
            "payload": { "recipient": "luke" },
            "created_at": "2025-05-04T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(message.priority, MessagePriority::Normal);
        assert_eq!(message.max_retries, DEFAULT_MAX_RETRIES);
    }
}
