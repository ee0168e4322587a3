//! In-memory audit log.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{AuditLogEntry, TaskId},
    ports::{AuditLogError, AuditLogRepository, AuditLogResult},
};

/// Thread-safe append-only audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> AuditLogError {
    AuditLogError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLog {
    async fn append(&self, entry: &AuditLogEntry) -> AuditLogResult<()> {
        self.entries
            .write()
            .map_err(lock_error)?
            .push(entry.clone());
        Ok(())
    }

    async fn entries_for_task(&self, task_id: TaskId) -> AuditLogResult<Vec<AuditLogEntry>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries
            .iter()
            .filter(|entry| entry.task_id() == task_id)
            .cloned()
            .collect())
    }

    async fn delete_for_task(&self, task_id: TaskId) -> AuditLogResult<usize> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        let before = entries.len();
        entries.retain(|entry| entry.task_id() != task_id);
        Ok(before - entries.len())
    }
}
