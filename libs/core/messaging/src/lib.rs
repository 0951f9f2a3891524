//! In-process messaging: a FIFO queue, a producer facade, and the background
//! processor that drains it on a timer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  publish   ┌───────────────┐
//! │ MessageQueueService  │───────────▶│               │
//! └──────────────────────┘            │ InMemoryQueue │
//! ┌──────────────────────┐ heartbeat  │    (FIFO)     │
//! │ BackgroundProcessor  │───────────▶│               │
//! │                      │◀───────────│               │
//! │  ┌────────────────┐  │ drain ≤ 1  └───────────────┘
//! │  │HandlerRegistry │──│──▶ type → MessageHandler
//! │  └────────────────┘  │
//! └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use messaging::{BackgroundProcessor, HandlerRegistry, InMemoryQueue, ProcessorConfig};
//!
//! let queue = Arc::new(InMemoryQueue::new());
//! let handlers = HandlerRegistry::new().register(messaging::SCHEDULED_TASK, reset_handler);
//! let processor = BackgroundProcessor::new(queue.clone(), handlers, ProcessorConfig::default());
//!
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! tokio::spawn(async move { processor.run(shutdown_rx).await });
//! ```

mod config;
mod error;
mod handler;
mod message;
mod processor;
mod publisher;
mod queue;

pub use config::ProcessorConfig;
pub use error::{ErrorCategory, ProcessingError, QueueError, QueueResult};
pub use handler::{HandlerRegistry, MessageHandler};
pub use message::{DEFAULT_MAX_RETRIES, MessagePriority, QueueMessage};
pub use processor::{
    BackgroundProcessor, CycleReport, MAX_MESSAGES_PER_CYCLE, ProcessorPhase, SCHEDULED_TASK,
};
pub use publisher::{MessageQueueService, NOTIFICATION};
pub use queue::{InMemoryQueue, MessageQueue};
