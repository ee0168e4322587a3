//! Outbound publish port.

use crate::events::domain::{BusMessage, Topic};
use crate::failure::FailureKind;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Publishes serialised events to named topics.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes `message` on its topic.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the bus rejects or cannot be reached.
    async fn publish(&self, message: &BusMessage) -> PublishResult<()>;
}

/// Errors returned by message bus implementations.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// The bus answered with a non-success status.
    #[error("publish to {topic} rejected with status {status}: {body}")]
    Rejected {
        /// Target topic.
        topic: Topic,
        /// HTTP status returned.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The bus could not be reached.
    #[error("publish transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The bus refused the message for a local reason.
    #[error("bus unavailable: {0}")]
    Unavailable(String),
}

impl PublishError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Classifies the failure for retry decisions.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Rejected { status, body, .. } => FailureKind::from_response(*status, body),
            Self::Transport(err) => FailureKind::from_message(&err.to_string()),
            Self::Unavailable(reason) => FailureKind::from_message(reason),
        }
    }
}
