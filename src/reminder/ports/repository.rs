//! Repository port for reminders.

use crate::reminder::domain::{NewReminder, Reminder, ReminderId};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for reminder repository operations.
pub type ReminderRepositoryResult<T> = Result<T, ReminderRepositoryError>;

/// Reminder persistence contract.
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Stores a new reminder and assigns its identifier.
    async fn insert(&self, reminder: NewReminder) -> ReminderRepositoryResult<Reminder>;

    /// Persists changes to an existing reminder.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderRepositoryError::NotFound`] when it does not exist.
    async fn update(&self, reminder: &Reminder) -> ReminderRepositoryResult<()>;

    /// Finds a reminder by identifier.
    async fn find_by_id(&self, id: ReminderId) -> ReminderRepositoryResult<Option<Reminder>>;

    /// Lists a task's reminders ordered by fire time.
    async fn find_by_task(&self, task_id: TaskId) -> ReminderRepositoryResult<Vec<Reminder>>;

    /// Removes every reminder of a task, returning how many were removed.
    async fn delete_for_task(&self, task_id: TaskId) -> ReminderRepositoryResult<usize>;
}

/// Errors returned by reminder repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ReminderRepositoryError {
    /// The reminder was not found.
    #[error("reminder not found: {0}")]
    NotFound(ReminderId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReminderRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
