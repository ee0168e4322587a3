//! Port for creating tasks in the backend.

use crate::failure::FailureKind;
use crate::recurring::domain::NextOccurrenceRequest;
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task API calls.
pub type TaskApiResult<T> = Result<T, TaskApiError>;

/// Creates task rows on behalf of the worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCreationApi: Send + Sync {
    /// Creates the next occurrence and returns its identifier.
    ///
    /// Implementations must return the existing occurrence when the parent
    /// already has one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskApiError`] when the backend rejects the request or
    /// cannot be reached.
    async fn create_next_occurrence(
        &self,
        request: &NextOccurrenceRequest,
    ) -> TaskApiResult<TaskId>;
}

/// Errors returned by task API implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskApiError {
    /// The backend answered with a non-success status.
    #[error("task creation rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status returned.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The backend could not be reached.
    #[error("task API transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The backend answered with something other than a task.
    #[error("invalid task API response: {0}")]
    InvalidResponse(String),

    /// An in-process backend refused the request.
    #[error("task creation failed: {0}")]
    Local(String),
}

impl TaskApiError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Classifies the failure for retry decisions.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Rejected { status, body } => FailureKind::from_response(*status, body),
            Self::Transport(err) => FailureKind::from_message(&err.to_string()),
            Self::InvalidResponse(_) => FailureKind::Permanent,
            Self::Local(reason) => FailureKind::from_message(reason),
        }
    }
}
