//! Port for the external one-shot job scheduler.

use crate::failure::FailureKind;
use crate::reminder::domain::{JobId, JobStatus, ReminderJob};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for job scheduler operations.
pub type JobSchedulerResult<T> = Result<T, JobSchedulerError>;

/// Registers, inspects, and removes one-shot jobs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobScheduler: Send + Sync {
    /// Registers a job, replacing any job with the same id.
    async fn schedule(&self, job: &ReminderJob) -> JobSchedulerResult<()>;

    /// Fetches a job; `None` when the scheduler does not know it.
    async fn status(&self, job_id: &JobId) -> JobSchedulerResult<Option<JobStatus>>;

    /// Removes a job. Removing an unknown job succeeds.
    async fn delete(&self, job_id: &JobId) -> JobSchedulerResult<()>;
}

/// Errors returned by job scheduler implementations.
#[derive(Debug, Clone, Error)]
pub enum JobSchedulerError {
    /// The scheduler answered with a non-success status.
    #[error("job scheduler rejected {job_id} with status {status}: {body}")]
    Rejected {
        /// Job concerned.
        job_id: JobId,
        /// HTTP status returned.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The scheduler could not be reached.
    #[error("job scheduler transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The scheduler's response could not be read.
    #[error("invalid job scheduler response: {0}")]
    InvalidResponse(String),
}

impl JobSchedulerError {
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
            Self::InvalidResponse(_) => FailureKind::Permanent,
        }
    }
}
