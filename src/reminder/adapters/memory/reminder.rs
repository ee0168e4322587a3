//! In-memory reminder repository.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::reminder::{
    domain::{NewReminder, Reminder, ReminderId},
    ports::{ReminderRepository, ReminderRepositoryError, ReminderRepositoryResult},
};
use crate::task::domain::TaskId;

/// Thread-safe in-memory reminder repository with sequential identifiers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReminderRepository {
    state: Arc<RwLock<InMemoryReminderState>>,
}

#[derive(Debug, Default)]
struct InMemoryReminderState {
    last_id: i64,
    reminders: BTreeMap<ReminderId, Reminder>,
}

impl InMemoryReminderRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> ReminderRepositoryError {
    ReminderRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ReminderRepository for InMemoryReminderRepository {
    async fn insert(&self, reminder: NewReminder) -> ReminderRepositoryResult<Reminder> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.last_id += 1;
        let id = ReminderId::new(state.last_id);
        let stored = reminder.into_reminder(id);
        state.reminders.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, reminder: &Reminder) -> ReminderRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let slot = state
            .reminders
            .get_mut(&reminder.id())
            .ok_or(ReminderRepositoryError::NotFound(reminder.id()))?;
        *slot = reminder.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: ReminderId) -> ReminderRepositoryResult<Option<Reminder>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.reminders.get(&id).cloned())
    }

    async fn find_by_task(&self, task_id: TaskId) -> ReminderRepositoryResult<Vec<Reminder>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut reminders: Vec<Reminder> = state
            .reminders
            .values()
            .filter(|reminder| reminder.task_id() == task_id)
            .cloned()
            .collect();
        reminders.sort_by_key(Reminder::scheduled_at);
        Ok(reminders)
    }

    async fn delete_for_task(&self, task_id: TaskId) -> ReminderRepositoryResult<usize> {
        let mut state = self.state.write().map_err(lock_error)?;
        let before = state.reminders.len();
        state
            .reminders
            .retain(|_, reminder| reminder.task_id() != task_id);
        Ok(before - state.reminders.len())
    }
}
