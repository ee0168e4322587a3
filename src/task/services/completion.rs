//! Task completion and next-occurrence creation.

use super::lifecycle::{TaskLifecycleResult, TaskLifecycleService};
use crate::events::{CorrelationId, EventType};
use crate::task::{
    domain::{AuditEventKind, AuditLogEntry, Task, TaskId},
    ports::{AuditLogRepository, TaskRepository},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Value, json};

/// Summary of the occurrence created when a repeating task is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextOccurrence {
    /// Identifier of the new task.
    pub id: TaskId,
    /// Title copied from the completed task.
    pub title: String,
    /// Advanced due date.
    pub due_date: Option<DateTime<Utc>>,
    /// When the new task was stored.
    pub created_at: DateTime<Utc>,
    /// The completed task.
    pub parent_task_id: Option<TaskId>,
}

impl From<&Task> for NextOccurrence {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().as_str().to_owned(),
            due_date: task.due_date(),
            created_at: task.created_at(),
            parent_task_id: task.parent_task_id(),
        }
    }
}

/// A successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletion {
    /// The completed task.
    pub task: Task,
    /// Whether the task repeats.
    pub is_recurring: bool,
    /// The next occurrence, when one exists.
    pub next_occurrence: Option<NextOccurrence>,
    /// Why the next occurrence could not be created.
    pub next_occurrence_error: Option<String>,
    /// Whether `task.completed` reached the bus.
    pub event_published: bool,
}

/// Result of [`TaskLifecycleService::complete_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The task moved to `completed`.
    Completed(TaskCompletion),
    /// The task was already completed; nothing changed.
    AlreadyCompleted(Task),
}

impl<R, A, C> TaskLifecycleService<R, A, C>
where
    R: TaskRepository,
    A: AuditLogRepository,
    C: Clock + Send + Sync,
{
    /// Completes a task and, when it repeats, creates its next occurrence.
    ///
    /// The completion is persisted before anything else. Creating the next
    /// occurrence is best-effort: a failure is reported on the outcome and
    /// in the audit log, and the completion stands. A task completed twice
    /// keeps a single next occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`](super::TaskLifecycleError::NotFound)
    /// for unknown tasks, or a repository error when the completion itself
    /// cannot be stored.
    pub async fn complete_task(&self, id: TaskId) -> TaskLifecycleResult<CompletionOutcome> {
        let mut task = self.find_required(id).await?;
        if task.is_completed() {
            return Ok(CompletionOutcome::AlreadyCompleted(task));
        }
        let old_status = task.status();
        task.complete(&*self.clock)?;
        self.tasks.update(&task).await?;

        let correlation_id = CorrelationId::new();
        let is_recurring = task.recurrence().is_recurring();
        let (next_occurrence, next_occurrence_error) = if is_recurring {
            match self.next_occurrence_for(&task, correlation_id).await {
                Ok(next) => (next, None),
                Err(error) => (None, Some(error)),
            }
        } else {
            (None, None)
        };
        let next_occurrence_id = next_occurrence.as_ref().map(|next| next.id);

        self.record(
            AuditLogEntry::record(
                AuditEventKind::TaskCompleted,
                id,
                json!({
                    "old_status": old_status.as_str(),
                    "new_status": task.status().as_str(),
                    "is_recurring": is_recurring,
                    "recurrence": task.recurrence().to_pattern_string(),
                    "next_occurrence_id": next_occurrence_id,
                }),
                &*self.clock,
            )
            .with_parent(task.parent_task_id()),
        )
        .await;
        if let Some(error) = &next_occurrence_error {
            self.record(
                AuditLogEntry::record(
                    AuditEventKind::NextOccurrenceFailed,
                    id,
                    json!({ "error": error, "recurrence": task.recurrence().to_pattern_string() }),
                    &*self.clock,
                )
                .with_parent(task.parent_task_id()),
            )
            .await;
        }

        let event_published = self
            .events
            .publish_task_event(
                EventType::TaskCompleted,
                id,
                completion_data(&task, is_recurring, next_occurrence_id),
                correlation_id,
            )
            .await;
        tracing::info!(
            task_id = %id,
            is_recurring,
            next_occurrence_id = ?next_occurrence_id,
            "task completed"
        );

        Ok(CompletionOutcome::Completed(TaskCompletion {
            task,
            is_recurring,
            next_occurrence,
            next_occurrence_error,
            event_published,
        }))
    }

    async fn next_occurrence_for(
        &self,
        task: &Task,
        correlation_id: CorrelationId,
    ) -> Result<Option<NextOccurrence>, String> {
        let existing = self
            .tasks
            .find_children(task.id())
            .await
            .map_err(|err| err.to_string())?;
        if let Some(child) = existing.first() {
            return Ok(Some(NextOccurrence::from(child)));
        }
        let Some(draft) = task.next_occurrence(&*self.clock) else {
            return Ok(None);
        };
        match self.tasks.insert(draft).await {
            Ok(next) => {
                self.announce_created(&next, correlation_id).await;
                Ok(Some(NextOccurrence::from(&next)))
            }
            Err(err) => {
                tracing::error!(
                    task_id = %task.id(),
                    error = %err,
                    "failed to create next occurrence"
                );
                Err(err.to_string())
            }
        }
    }
}

fn completion_data(task: &Task, is_recurring: bool, next_occurrence_id: Option<TaskId>) -> Value {
    let mut data = task.snapshot();
    if let Value::Object(fields) = &mut data {
        fields.insert("is_recurring".to_owned(), Value::Bool(is_recurring));
        fields.insert("next_occurrence_id".to_owned(), json!(next_occurrence_id));
    }
    data
}
