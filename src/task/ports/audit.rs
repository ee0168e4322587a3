//! Append-only audit log port.

use crate::task::domain::{AuditLogEntry, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit log operations.
pub type AuditLogResult<T> = Result<T, AuditLogError>;

/// Audit trail storage. Entries are never modified once appended.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Persistence`] when storage fails.
    async fn append(&self, entry: &AuditLogEntry) -> AuditLogResult<()>;

    /// Lists entries for a task in append order.
    async fn entries_for_task(&self, task_id: TaskId) -> AuditLogResult<Vec<AuditLogEntry>>;

    /// Removes every entry for a task, returning how many were removed.
    async fn delete_for_task(&self, task_id: TaskId) -> AuditLogResult<usize>;
}

/// Errors returned by audit log implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditLogError {
    /// Persistence-layer failure.
    #[error("audit persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
