//! Handlers run by the background processor.

use async_trait::async_trait;
use domain_metrics::{MetricsBackend, MetricsService};
use messaging::{
    HandlerRegistry, MessageHandler, NOTIFICATION, ProcessingError, QueueMessage, SCHEDULED_TASK,
};
use std::sync::Arc;
use tracing::info;

/// Resets the search statistics each time a scheduled task is drained.
pub struct ResetMetricsHandler<B: MetricsBackend> {
    metrics: MetricsService<B>,
}

impl<B: MetricsBackend> ResetMetricsHandler<B> {
    pub fn new(metrics: MetricsService<B>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl<B: MetricsBackend + 'static> MessageHandler for ResetMetricsHandler<B> {
    async fn handle(&self, message: &QueueMessage) -> Result<(), ProcessingError> {
        if !self.metrics.delete_all_metrics() {
            return Err(ProcessingError::transient("metrics reset reported failure"));
        }
        info!(
            message_id = %message.id,
            session = %self.metrics.current_session(),
            "Scheduled metrics reset done"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "reset-metrics"
    }
}

/// Logs drained notifications; nothing is delivered.
pub struct NotificationLogHandler;

#[async_trait]
impl MessageHandler for NotificationLogHandler {
    async fn handle(&self, message: &QueueMessage) -> Result<(), ProcessingError> {
        let recipient = message
            .payload
            .get("recipient")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProcessingError::permanent("notification without recipient"))?;

        info!(message_id = %message.id, recipient, "Notification processed");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "notification-log"
    }
}

/// Handler table used by the processor.
pub fn registry<B: MetricsBackend + 'static>(metrics: MetricsService<B>) -> HandlerRegistry {
    HandlerRegistry::new()
        .register(SCHEDULED_TASK, Arc::new(ResetMetricsHandler::new(metrics)))
        .register(NOTIFICATION, Arc::new(NotificationLogHandler))
}
