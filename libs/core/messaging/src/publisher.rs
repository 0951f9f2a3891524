//! Producer-side facade over a [`MessageQueue`].

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::QueueResult;
use crate::message::QueueMessage;
use crate::queue::MessageQueue;

/// Message type used for user notifications.
pub const NOTIFICATION: &str = "Notification";

/// Publishes messages onto a shared queue.
pub struct MessageQueueService<Q: MessageQueue> {
    queue: Arc<Q>,
}

impl<Q: MessageQueue> Clone for MessageQueueService<Q> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<Q: MessageQueue> MessageQueueService<Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// Enqueues an already-built message and returns its id.
    #[instrument(skip(self, message), fields(message_type = %message.message_type))]
    pub fn publish(&self, message: QueueMessage) -> QueueResult<Uuid> {
        let id = message.id;
        self.queue.enqueue(message)?;
        Ok(id)
    }

    /// Builds and enqueues a `Notification` message.
    pub fn publish_notification(
        &self,
        recipient: &str,
        title: &str,
        content: &str,
    ) -> QueueResult<Uuid> {
        let message = QueueMessage::new(
            NOTIFICATION,
            json!({
                "recipient": recipient,
                "title": title,
                "content": content,
                "sent_at": Utc::now(),
            }),
        );

        let id = self.publish(message)?;
        info!(message_id = %id, recipient, "Notification queued");
        Ok(id)
    }

    /// Messages currently waiting.
    pub fn pending(&self) -> usize {
        self.queue.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::InMemoryQueue;

    #[test]
    fn test_publish_notification_builds_payload() {
        let queue = Arc::new(InMemoryQueue::new());
        let service = MessageQueueService::new(queue.clone());

        let id = service
            .publish_notification("obi-wan", "Status", "Hello there")
            .unwrap();

        let message = queue.try_dequeue().unwrap();
        assert_eq!(message.id, id);
        assert_eq!(message.message_type, NOTIFICATION);
        assert_eq!(message.payload["recipient"], "obi-wan");
        assert_eq!(message.payload["title"], "Status");
        assert_eq!(message.payload["content"], "Hello there");
        assert!(message.payload["sent_at"].is_string());
    }

    #[test]
    fn test_publish_reports_pending_count() {
        let queue = Arc::new(InMemoryQueue::new());
        let service = MessageQueueService::new(queue);

        service.publish_notification("a", "t", "c").unwrap();
        service.clone().publish_notification("b", "t", "c").unwrap();

        assert_eq!(service.pending(), 2);
    }

    #[test]
    fn test_publish_propagates_invalid_message() {
        let service = MessageQueueService::new(Arc::new(InMemoryQueue::new()));

        let result = service.publish(QueueMessage::new("", serde_json::Value::Null));

        assert!(result.is_err());
        assert_eq!(service.pending(), 0);
    }
}
