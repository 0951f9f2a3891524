//! Error types for queueing and message handling.

use std::fmt;
use thiserror::Error;

/// Errors raised by [`MessageQueue`](crate::MessageQueue) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The message carries no routable type and cannot be enqueued
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// How a handler failure should be read in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Downstream unavailable or timed out
    Transient,
    /// Bad payload or a bug; retrying would not help
    Permanent,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transient => write!(f, "transient"),
            ErrorCategory::Permanent => write!(f, "permanent"),
        }
    }
}

/// Error returned by a [`MessageHandler`](crate::MessageHandler).
///
/// The processor never retries or requeues; the category only shapes the log.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("transient error: {message}")]
    Transient {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("permanent error: {message}")]
    Permanent {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ProcessingError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            source: None,
        }
    }

    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent {
            message: message.into(),
            source: None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ProcessingError::Transient { .. } => ErrorCategory::Transient,
            ProcessingError::Permanent { .. } | ProcessingError::Payload(_) => {
                ErrorCategory::Permanent
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_error_category() {
        assert_eq!(
            ProcessingError::transient("metrics backend timed out").category(),
            ErrorCategory::Transient
        );
        assert_eq!(
            ProcessingError::permanent("missing recipient").category(),
            ErrorCategory::Permanent
        );

        let payload_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        assert_eq!(
            ProcessingError::from(payload_err).category(),
            ErrorCategory::Permanent
        );
    }

    #[test]
    fn test_transient_with_source_keeps_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline");
        let err = ProcessingError::transient_with_source("reset failed", io);

        assert_eq!(err.to_string(), "transient error: reset failed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
