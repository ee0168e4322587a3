//! In-process task creation through the lifecycle service.

use crate::recurring::{
    domain::NextOccurrenceRequest,
    ports::{TaskApiError, TaskApiResult, TaskCreationApi},
};
use crate::task::{
    domain::TaskId,
    ports::{AuditLogRepository, TaskRepository},
    services::{CreateTaskRequest, TaskLifecycleService},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

/// Creates occurrences directly when the worker runs beside the backend.
pub struct LifecycleTaskApi<R, A, C>
where
    R: TaskRepository,
    A: AuditLogRepository,
    C: Clock + Send + Sync,
{
    lifecycle: Arc<TaskLifecycleService<R, A, C>>,
}

impl<R, A, C> LifecycleTaskApi<R, A, C>
where
    R: TaskRepository,
    A: AuditLogRepository,
    C: Clock + Send + Sync,
{
    /// Wraps a lifecycle service.
    #[must_use]
    pub const fn new(lifecycle: Arc<TaskLifecycleService<R, A, C>>) -> Self {
        Self { lifecycle }
    }
}

#[async_trait]
impl<R, A, C> TaskCreationApi for LifecycleTaskApi<R, A, C>
where
    R: TaskRepository,
    A: AuditLogRepository,
    C: Clock + Send + Sync,
{
    async fn create_next_occurrence(
        &self,
        request: &NextOccurrenceRequest,
    ) -> TaskApiResult<TaskId> {
        let mut create = CreateTaskRequest::new(request.title.clone())
            .with_priority(request.priority)
            .with_due_date(request.due_date)
            .with_recurrence(request.recurrence.clone())
            .with_parent(request.metadata.parent_task_id);
        if let Some(description) = &request.description {
            create = create.with_description(description.clone());
        }
        self.lifecycle
            .create_task(create)
            .await
            .map(|task| task.id())
            .map_err(|err| TaskApiError::Local(err.to_string()))
    }
}
