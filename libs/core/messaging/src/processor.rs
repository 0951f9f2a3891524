//! Timer-driven loop that publishes a heartbeat and drains the queue.
//!
//! Each cycle moves through `Idle -> Publishing -> Draining -> Sleeping` and
//! back to `Idle` until the shutdown receiver flips to `true`.

use chrono::Utc;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::ProcessorConfig;
use crate::error::QueueResult;
use crate::handler::HandlerRegistry;
use crate::message::{MessagePriority, QueueMessage};
use crate::queue::MessageQueue;

/// Message type of the heartbeat published every cycle.
pub const SCHEDULED_TASK: &str = "ScheduledTask";

/// Upper bound on messages handled per cycle.
pub const MAX_MESSAGES_PER_CYCLE: usize = 1;

/// Where the processor currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorPhase {
    Idle,
    Publishing,
    Draining,
    Sleeping,
}

impl fmt::Display for ProcessorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessorPhase::Idle => "idle",
            ProcessorPhase::Publishing => "publishing",
            ProcessorPhase::Draining => "draining",
            ProcessorPhase::Sleeping => "sleeping",
        };
        f.write_str(name)
    }
}

/// Outcome of a single [`BackgroundProcessor::run_cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Whether the heartbeat made it onto the queue
    pub published: bool,
    /// Messages taken off the queue this cycle
    pub processed: usize,
}

/// Publishes a heartbeat every cycle and dispatches at most
/// [`MAX_MESSAGES_PER_CYCLE`] queued messages to their handlers.
///
/// Failures in either step are logged and never stop the loop.
pub struct BackgroundProcessor<Q: MessageQueue> {
    queue: Arc<Q>,
    handlers: HandlerRegistry,
    config: ProcessorConfig,
    phase: watch::Sender<ProcessorPhase>,
}

impl<Q: MessageQueue> BackgroundProcessor<Q> {
    pub fn new(queue: Arc<Q>, handlers: HandlerRegistry, config: ProcessorConfig) -> Self {
        let (phase, _) = watch::channel(ProcessorPhase::Idle);
        Self {
            queue,
            handlers,
            config,
            phase,
        }
    }

    /// Observe phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<ProcessorPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> ProcessorPhase {
        *self.phase.borrow()
    }

    fn enter(&self, phase: ProcessorPhase) {
        debug!(%phase, "Processor phase change");
        self.phase.send_replace(phase);
    }

    /// Runs cycles until `shutdown` becomes `true` or its sender is dropped.
    ///
    /// The sleep between cycles is raced against the shutdown signal, so the
    /// loop stops without waiting out the interval.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            handlers = ?self.handlers,
            "Background processor started"
        );

        loop {
            if *shutdown.borrow() {
                info!("Received shutdown signal, stopping background processor");
                break;
            }

            self.run_cycle().await;

            self.enter(ProcessorPhase::Sleeping);
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Received shutdown signal, stopping background processor");
                        break;
                    }
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
            self.enter(ProcessorPhase::Idle);
        }

        self.enter(ProcessorPhase::Idle);
        info!("Background processor stopped");
    }

    /// One Publishing + Draining pass.
    pub async fn run_cycle(&self) -> CycleReport {
        self.enter(ProcessorPhase::Publishing);
        let published = match self.publish_heartbeat() {
            Ok(id) => {
                debug!(message_id = %id, "Heartbeat published");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to publish heartbeat");
                false
            }
        };

        let processed = self.drain_once().await;
        self.enter(ProcessorPhase::Idle);

        CycleReport {
            published,
            processed,
        }
    }

    /// Enqueues this cycle's `ScheduledTask` heartbeat.
    pub fn publish_heartbeat(&self) -> QueueResult<Uuid> {
        let task_id = Uuid::new_v4();
        let message = QueueMessage::new(
            SCHEDULED_TASK,
            json!({
                "executed_at": Utc::now(),
                "source": self.config.source,
                "description": "Scheduled task execution",
                "task_id": task_id,
            }),
        )
        .with_priority(MessagePriority::Normal);

        let id = message.id;
        self.queue.enqueue(message)?;
        Ok(id)
    }

    /// Dequeues up to [`MAX_MESSAGES_PER_CYCLE`] messages and dispatches each.
    ///
    /// Returns how many messages were taken off the queue.
    #[instrument(skip(self))]
    pub async fn drain_once(&self) -> usize {
        self.enter(ProcessorPhase::Draining);

        let mut processed = 0;
        while processed < MAX_MESSAGES_PER_CYCLE {
            let Some(message) = self.queue.try_dequeue() else {
                break;
            };
            self.dispatch(&message).await;
            processed += 1;
        }

        info!(
            count = processed,
            remaining = self.queue.count(),
            "Processed {processed} messages in this cycle"
        );
        processed
    }

    async fn dispatch(&self, message: &QueueMessage) {
        let Some(handler) = self.handlers.get(&message.message_type) else {
            debug!(
                message_id = %message.id,
                message_type = %message.message_type,
                "No handler registered, dropping message"
            );
            return;
        };

        match handler.handle(message).await {
            Ok(()) => debug!(
                message_id = %message.id,
                handler = handler.name(),
                "Message handled"
            ),
            Err(e) => warn!(
                message_id = %message.id,
                handler = handler.name(),
                category = %e.category(),
                error = %e,
                "Message handler failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::handler::{MessageHandler, MockMessageHandler};
    use crate::queue::InMemoryQueue;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the ids it sees, in order.
    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle(&self, message: &QueueMessage) -> Result<(), ProcessingError> {
            self.seen.lock().unwrap().push(message.id);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn processor_with(
        registry: HandlerRegistry,
    ) -> (BackgroundProcessor<InMemoryQueue>, Arc<InMemoryQueue>) {
        let queue = Arc::new(InMemoryQueue::new());
        let processor = BackgroundProcessor::new(
            queue.clone(),
            registry,
            ProcessorConfig::with_interval(Duration::from_secs(3600)),
        );
        (processor, queue)
    }

    #[tokio::test]
    async fn test_drain_processes_one_message_per_cycle_oldest_first() {
        let recorder = Arc::new(RecordingHandler::default());
        let (processor, queue) =
            processor_with(HandlerRegistry::new().register("Notification", recorder.clone()));

        let mut ids = Vec::new();
        for n in 0..3 {
            let message = QueueMessage::new("Notification", json!({ "n": n }));
            ids.push(message.id);
            queue.enqueue(message).unwrap();
        }

        assert_eq!(processor.drain_once().await, 1);
        assert_eq!(queue.count(), 2);
        assert_eq!(*recorder.seen.lock().unwrap(), vec![ids[0]]);

        assert_eq!(processor.drain_once().await, 1);
        assert_eq!(processor.drain_once().await, 1);
        assert_eq!(*recorder.seen.lock().unwrap(), ids);

        // Empty queue: no dispatch, no error
        assert_eq!(processor.drain_once().await, 0);
        assert_eq!(recorder.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_run_cycle_publishes_heartbeat_and_dispatches_it() {
        let mut handler = MockMessageHandler::new();
        handler
            .expect_handle()
            .withf(|message| {
                message.message_type == SCHEDULED_TASK
                    && message.priority == MessagePriority::Normal
                    && message.payload["source"] == "background-processor"
                    && message.payload["description"] == "Scheduled task execution"
                    && message.payload["task_id"].is_string()
                    && message.payload["executed_at"].is_string()
            })
            .times(1)
            .returning(|_| Ok(()));
        handler.expect_name().return_const("reset");

        let (processor, queue) =
            processor_with(HandlerRegistry::new().register(SCHEDULED_TASK, Arc::new(handler)));

        let report = processor.run_cycle().await;

        assert_eq!(
            report,
            CycleReport {
                published: true,
                processed: 1
            }
        );
        assert!(queue.is_empty());
        assert_eq!(processor.phase(), ProcessorPhase::Idle);
    }

    #[tokio::test]
    async fn test_backlog_drains_one_per_cycle() {
        let (processor, queue) = processor_with(HandlerRegistry::new());
        queue
            .enqueue(QueueMessage::new("Notification", json!({})))
            .unwrap();

        // Heartbeat lands behind the backlog; the oldest message goes first.
        let report = processor.run_cycle().await;

        assert_eq!(report.processed, 1);
        assert_eq!(queue.count(), 1);
        assert_eq!(
            queue.try_peek().map(|m| m.message_type),
            Some(SCHEDULED_TASK.to_string())
        );
    }

    #[tokio::test]
    async fn test_unregistered_type_is_a_no_op() {
        let mut handler = MockMessageHandler::new();
        handler.expect_handle().never();
        handler.expect_name().return_const("reset");

        let (processor, queue) =
            processor_with(HandlerRegistry::new().register(SCHEDULED_TASK, Arc::new(handler)));
        queue
            .enqueue(QueueMessage::new("Notification", json!({})))
            .unwrap();

        assert_eq!(processor.drain_once().await, 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_is_swallowed() {
        let mut handler = MockMessageHandler::new();
        handler
            .expect_handle()
            .times(2)
            .returning(|_| Err(ProcessingError::transient("metrics backend down")));
        handler.expect_name().return_const("reset");

        let (processor, _queue) =
            processor_with(HandlerRegistry::new().register(SCHEDULED_TASK, Arc::new(handler)));

        assert_eq!(processor.run_cycle().await.processed, 1);
        assert_eq!(processor.run_cycle().await.processed, 1);
    }

    #[tokio::test]
    async fn test_run_stops_promptly_while_sleeping() {
        let (processor, queue) = processor_with(HandlerRegistry::new());
        let processor = Arc::new(processor);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut phase = processor.subscribe_phase();

        let task = {
            let processor = processor.clone();
            tokio::spawn(async move { processor.run(shutdown_rx).await })
        };

        // Wait for the first cycle to finish and the hour-long sleep to begin
        phase
            .wait_for(|p| *p == ProcessorPhase::Sleeping)
            .await
            .unwrap();
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("processor should stop without waiting out the interval")
            .unwrap();

        assert_eq!(processor.phase(), ProcessorPhase::Idle);
        // The single heartbeat was published and drained in the first cycle
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_when_sender_dropped() {
        let (processor, _queue) = processor_with(HandlerRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        drop(shutdown_tx);

        tokio::time::timeout(Duration::from_secs(1), processor.run(shutdown_rx))
            .await
            .expect("processor should stop once the shutdown sender is gone");
    }

    #[tokio::test]
    async fn test_run_exits_immediately_when_already_shut_down() {
        let (processor, queue) = processor_with(HandlerRegistry::new());
        let (_shutdown_tx, shutdown_rx) = watch::channel(true);

        processor.run(shutdown_rx).await;

        assert!(queue.is_empty());
    }
}
