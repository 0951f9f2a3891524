//! In-process FIFO message queue.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{QueueError, QueueResult};
use crate::message::QueueMessage;

/// A thread-safe FIFO of [`QueueMessage`]s.
///
/// Implementations synchronize internally; callers never hold a lock.
/// Delivery order is insertion order regardless of priority.
pub trait MessageQueue: Send + Sync {
    /// Appends `message` to the tail.
    ///
    /// Fails with [`QueueError::InvalidMessage`] when the message has a blank type.
    fn enqueue(&self, message: QueueMessage) -> QueueResult<()>;

    /// Removes and returns the head, or `None` when empty.
    fn try_dequeue(&self) -> Option<QueueMessage>;

    /// Returns a copy of the head without removing it.
    fn try_peek(&self) -> Option<QueueMessage>;

    fn count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Unbounded [`MessageQueue`] backed by a mutex-guarded `VecDeque`.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    messages: Mutex<VecDeque<QueueMessage>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the deque half-modified,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<QueueMessage>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageQueue for InMemoryQueue {
    fn enqueue(&self, message: QueueMessage) -> QueueResult<()> {
        if message.message_type.trim().is_empty() {
            return Err(QueueError::InvalidMessage(format!(
                "message {} has no type",
                message.id
            )));
        }

        debug!(message_id = %message.id, message_type = %message.message_type, "Enqueued message");
        self.lock().push_back(message);
        Ok(())
    }

    fn try_dequeue(&self) -> Option<QueueMessage> {
        self.lock().pop_front()
    }

    fn try_peek(&self) -> Option<QueueMessage> {
        self.lock().front().cloned()
    }

    fn count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessagePriority;
    use serde_json::json;
    use std::sync::Arc;

    fn message(kind: &str, n: u32) -> QueueMessage {
        QueueMessage::new(kind, json!({ "n": n }))
    }

    #[test]
    fn test_enqueue_then_dequeue_returns_same_message() {
        let queue = InMemoryQueue::new();
        let original = message("Notification", 1);

        queue.enqueue(original.clone()).unwrap();

        assert_eq!(queue.try_dequeue(), Some(original));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_order_ignores_priority() {
        let queue = InMemoryQueue::new();
        let low = message("a", 1).with_priority(MessagePriority::Low);
        let critical = message("b", 2).with_priority(MessagePriority::Critical);

        queue.enqueue(low.clone()).unwrap();
        queue.enqueue(critical.clone()).unwrap();

        assert_eq!(queue.try_dequeue().map(|m| m.id), Some(low.id));
        assert_eq!(queue.try_dequeue().map(|m| m.id), Some(critical.id));
    }

    #[test]
    fn test_count_after_enqueues_and_dequeues() {
        let queue = InMemoryQueue::new();
        for n in 0..5 {
            queue.enqueue(message("Notification", n)).unwrap();
        }
        queue.try_dequeue();
        queue.try_dequeue();

        assert_eq!(queue.count(), 3);
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_dequeue_on_empty_queue_is_none() {
        let queue = InMemoryQueue::new();
        assert_eq!(queue.try_dequeue(), None);
        assert_eq!(queue.try_peek(), None);
        assert_eq!(queue.count(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let queue = InMemoryQueue::new();
        let head = message("Notification", 1);
        queue.enqueue(head.clone()).unwrap();
        queue.enqueue(message("Notification", 2)).unwrap();

        assert_eq!(queue.try_peek(), Some(head.clone()));
        assert_eq!(queue.count(), 2);
        assert_eq!(queue.try_dequeue(), Some(head));
    }

    #[test]
    fn test_blank_type_is_rejected() {
        let queue = InMemoryQueue::new();

        let err = queue.enqueue(message("   ", 1)).unwrap_err();

        assert!(matches!(err, QueueError::InvalidMessage(_)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_producers() {
        let queue = Arc::new(InMemoryQueue::new());
        let handles: Vec<_> = (0..4)
            .map(|producer| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for n in 0..250 {
                        queue.enqueue(message("Notification", producer * 1000 + n)).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.count(), 1000);
        let mut drained = 0;
        while queue.try_dequeue().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 1000);
        assert!(queue.is_empty());
    }
}
