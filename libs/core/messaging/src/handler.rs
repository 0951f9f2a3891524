//! Message handlers and the type-keyed dispatch table.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ProcessingError;
use crate::message::QueueMessage;

/// Side effect triggered by a drained message.
///
/// # Example
///
/// ```ignore
/// struct AuditHandler;
///
/// #[async_trait]
/// impl MessageHandler for AuditHandler {
///     async fn handle(&self, message: &QueueMessage) -> Result<(), ProcessingError> {
///         tracing::info!(id = %message.id, "audited");
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "audit"
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &QueueMessage) -> Result<(), ProcessingError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Maps a message type to its handler. Types without an entry are ignored.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `message_type` to `handler`, replacing any previous entry.
    pub fn register(
        mut self,
        message_type: impl Into<String>,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        self.handlers.insert(message_type.into(), handler);
        self
    }

    pub fn get(&self, message_type: &str) -> Option<&Arc<dyn MessageHandler>> {
        self.handlers.get(message_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes: Vec<_> = self
            .handlers
            .iter()
            .map(|(kind, handler)| (kind.as_str(), handler.name()))
            .collect();
        routes.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("routes", &routes)
            .finish()
    }
}
