//! Shared application state.

use domain_metrics::MetricsSession;
use messaging::{InMemoryQueue, MessageQueueService};
use mongodb::{Client, Database};
use std::sync::Arc;

/// Cloned into each router; every field is a handle.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
    /// Queue drained by the background processor
    pub queue: Arc<InMemoryQueue>,
    /// Metrics session shared by the recorders, the stats API and the reset job
    pub session: Arc<MetricsSession>,
}

impl AppState {
    pub fn publisher(&self) -> MessageQueueService<InMemoryQueue> {
        MessageQueueService::new(self.queue.clone())
    }
}
