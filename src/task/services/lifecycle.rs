//! Service layer for task creation, updates, deletion, and chain lookup.

use crate::events::{CorrelationId, EventPublisher, EventType};
use crate::recurrence::{RecurrencePattern, RecurrenceParseError, parse_recurrence, upcoming_occurrences};
use crate::task::{
    domain::{
        AuditEventKind, AuditLogEntry, NewTask, Priority, TagSet, Task, TaskChanges,
        TaskDomainError, TaskId, TaskTitle,
    },
    ports::{AuditLogError, AuditLogRepository, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: Priority,
    tags: Vec<String>,
    due_date: Option<DateTime<Utc>>,
    recurrence: Option<String>,
    parent_task_id: Option<TaskId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            tags: Vec::new(),
            due_date: None,
            recurrence: None,
            parent_task_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets raw tag text; tags are normalised on creation.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the recurrence as free text or a canonical pattern string.
    #[must_use]
    pub fn with_recurrence(mut self, recurrence: impl Into<String>) -> Self {
        self.recurrence = Some(recurrence.into());
        self
    }

    /// Marks the task as the next occurrence of `parent`.
    #[must_use]
    pub const fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent_task_id = Some(parent);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The recurrence text could not be parsed.
    #[error(transparent)]
    Recurrence(#[from] RecurrenceParseError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The audit log could not be read.
    #[error(transparent)]
    Audit(#[from] AuditLogError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every mutation is recorded in the audit log and announced on the bus.
/// Neither side effect can fail the mutation itself.
pub struct TaskLifecycleService<R, A, C>
where
    R: TaskRepository,
    A: AuditLogRepository,
    C: Clock + Send + Sync,
{
    pub(super) tasks: Arc<R>,
    pub(super) audit: Arc<A>,
    pub(super) events: EventPublisher,
    pub(super) clock: Arc<C>,
}

impl<R, A, C> Clone for TaskLifecycleService<R, A, C>
where
    R: TaskRepository,
    A: AuditLogRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            audit: Arc::clone(&self.audit),
            events: self.events.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, A, C> TaskLifecycleService<R, A, C>
where
    R: TaskRepository,
    A: AuditLogRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(tasks: Arc<R>, audit: Arc<A>, events: EventPublisher, clock: Arc<C>) -> Self {
        Self {
            tasks,
            audit,
            events,
            clock,
        }
    }

    /// Creates a task.
    ///
    /// When the request names a parent that already has a next occurrence,
    /// that existing task is returned and nothing new is stored, so repeated
    /// requests for the same completion never duplicate the chain.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the title, tags, or recurrence are
    /// invalid, or the repository fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        if let Some(parent) = request.parent_task_id
            && let Some(existing) = self.tasks.find_children(parent).await?.into_iter().next()
        {
            tracing::info!(
                parent_task_id = %parent,
                task_id = %existing.id(),
                "next occurrence already exists"
            );
            return Ok(existing);
        }

        let title = TaskTitle::new(&request.title)?;
        let tags = TagSet::parse(&request.tags)?;
        let recurrence = match request.recurrence.as_deref().map(str::trim) {
            None | Some("") => RecurrencePattern::none(),
            Some(text) => parse_recurrence(text)?,
        };
        let draft = NewTask::new(title, &*self.clock)
            .with_description(request.description)
            .with_priority(request.priority)
            .with_tags(tags)
            .with_due_date(request.due_date)
            .with_recurrence(recurrence)
            .with_parent(request.parent_task_id);

        let task = self.tasks.insert(draft).await?;
        self.announce_created(&task, CorrelationId::new()).await;
        Ok(task)
    }

    /// Records and publishes the creation of `task`.
    pub(super) async fn announce_created(&self, task: &Task, correlation_id: CorrelationId) {
        tracing::info!(
            task_id = %task.id(),
            recurrence = %task.recurrence(),
            parent_task_id = ?task.parent_task_id(),
            "task created"
        );
        self.record(
            AuditLogEntry::record(
                AuditEventKind::TaskCreated,
                task.id(),
                task.snapshot(),
                &*self.clock,
            )
            .with_parent(task.parent_task_id()),
        )
        .await;
        self.events
            .publish_task_event(EventType::TaskCreated, task.id(), task.snapshot(), correlation_id)
            .await;
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks or a
    /// repository error.
    pub async fn update_task(&self, id: TaskId, changes: TaskChanges) -> TaskLifecycleResult<Task> {
        let mut task = self.find_required(id).await?;
        if changes.is_empty() {
            return Ok(task);
        }
        let before = task.snapshot();
        task.apply_changes(changes, &*self.clock);
        self.tasks.update(&task).await?;

        let after = task.snapshot();
        self.record(
            AuditLogEntry::record(
                AuditEventKind::TaskUpdated,
                id,
                json!({ "old": before, "new": after }),
                &*self.clock,
            )
            .with_parent(task.parent_task_id()),
        )
        .await;
        self.events
            .publish_task_event(EventType::TaskUpdated, id, after, CorrelationId::new())
            .await;
        Ok(task)
    }

    /// Deletes a task and its audit trail.
    ///
    /// Later occurrences keep their `parent_task_id` back-reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks or a
    /// repository error.
    pub async fn delete_task(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        let task = self.find_required(id).await?;
        if let Err(err) = self.audit.delete_for_task(id).await {
            tracing::warn!(task_id = %id, error = %err, "failed to purge audit entries");
        }
        let deleted = self.tasks.delete(task.id()).await?;
        tracing::info!(task_id = %id, "task deleted");
        self.events
            .publish_task_event(EventType::TaskDeleted, id, deleted.snapshot(), CorrelationId::new())
            .await;
        Ok(deleted)
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when storage fails.
    pub async fn find_task(&self, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.tasks.find_by_id(id).await?)
    }

    /// Returns every occurrence linked to `id`, root first.
    ///
    /// The chain is found by walking `parent_task_id` up to the oldest
    /// surviving ancestor and then collecting its descendants breadth-first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks or a
    /// repository error.
    pub async fn recurring_chain(&self, id: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        let mut root = self.find_required(id).await?;
        let mut visited = BTreeSet::from([root.id()]);
        while let Some(parent_id) = root.parent_task_id() {
            if !visited.insert(parent_id) {
                break;
            }
            match self.tasks.find_by_id(parent_id).await? {
                Some(parent) => root = parent,
                None => break,
            }
        }

        let mut seen = BTreeSet::from([root.id()]);
        let mut queue = VecDeque::from([root.id()]);
        let mut chain = vec![root];
        while let Some(current) = queue.pop_front() {
            for child in self.tasks.find_children(current).await? {
                if seen.insert(child.id()) {
                    queue.push_back(child.id());
                    chain.push(child);
                }
            }
        }
        Ok(chain)
    }

    /// Lists the next `count` due dates of a repeating task.
    ///
    /// Returns an empty list for tasks that do not repeat.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks or a
    /// repository error.
    pub async fn preview_occurrences(
        &self,
        id: TaskId,
        count: usize,
    ) -> TaskLifecycleResult<Vec<DateTime<Utc>>> {
        let task = self.find_required(id).await?;
        let start = task.due_date().unwrap_or_else(|| self.clock.utc());
        Ok(upcoming_occurrences(start, &task.recurrence(), count))
    }

    /// Returns a task's audit entries in append order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Audit`] when the log cannot be read.
    pub async fn audit_history(&self, id: TaskId) -> TaskLifecycleResult<Vec<AuditLogEntry>> {
        Ok(self.audit.entries_for_task(id).await?)
    }

    pub(super) async fn find_required(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(id))
    }

    pub(super) async fn record(&self, draft: AuditLogEntry) {
        let entry = draft.with_user(self.events.user_id().as_str());
        if let Err(err) = self.audit.append(&entry).await {
            tracing::warn!(
                task_id = %entry.task_id(),
                event_type = %entry.event_type(),
                error = %err,
                "failed to append audit entry"
            );
        }
    }
}
