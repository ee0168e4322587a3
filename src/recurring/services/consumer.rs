//! Consumer creating missing next occurrences from `task.completed`.

use super::WorkerStats;
use crate::events::{BusMessage, EventHandler, EventType, HandlerOutcome, TaskEventPayload};
use crate::recurrence::parse_recurrence;
use crate::recurring::{
    domain::{CompletedTask, NextOccurrenceRequest},
    ports::TaskCreationApi,
};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use mockable::Clock;
use std::fmt;
use std::sync::Arc;

/// Why a completion needed no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The task does not repeat.
    NotRecurring,
    /// The backend already created the next occurrence.
    AlreadyCreated(TaskId),
    /// The pattern yields no later date.
    NoNextDate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecurring => f.write_str("not recurring"),
            Self::AlreadyCreated(id) => write!(f, "next occurrence {id} already exists"),
            Self::NoNextDate => f.write_str("no next date"),
        }
    }
}

/// Consumes `task-events` and fills in next occurrences the backend could
/// not create itself.
pub struct TaskEventConsumer<A, C>
where
    A: TaskCreationApi,
    C: Clock + Send + Sync,
{
    api: Arc<A>,
    clock: Arc<C>,
    stats: Arc<WorkerStats>,
}

impl<A, C> TaskEventConsumer<A, C>
where
    A: TaskCreationApi,
    C: Clock + Send + Sync,
{
    /// Creates a consumer calling `api`.
    #[must_use]
    pub fn new(api: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            api,
            clock,
            stats: Arc::new(WorkerStats::default()),
        }
    }

    /// Returns the consumer's counters.
    #[must_use]
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    fn skip(&self, task_id: TaskId, reason: SkipReason) -> HandlerOutcome {
        self.stats.record_skipped();
        tracing::debug!(task_id = %task_id, reason = %reason, "completion skipped");
        HandlerOutcome::Handled
    }

    fn fail(&self, task_id: TaskId, reason: String) -> HandlerOutcome {
        self.stats.record_error();
        tracing::warn!(task_id = %task_id, reason = %reason, "completion dropped");
        HandlerOutcome::Drop(reason)
    }
}

#[async_trait]
impl<A, C> EventHandler for TaskEventConsumer<A, C>
where
    A: TaskCreationApi,
    C: Clock + Send + Sync,
{
    async fn handle(&self, message: &BusMessage) -> HandlerOutcome {
        if message.event_type() != EventType::TaskCompleted {
            return HandlerOutcome::Handled;
        }
        let payload = match message.decode::<TaskEventPayload>() {
            Ok(envelope) => envelope.into_payload(),
            Err(err) => {
                self.stats.record_error();
                return HandlerOutcome::Drop(err.to_string());
            }
        };
        let task_id = payload.task_id;
        self.stats.record_processed(self.clock.utc());

        let task: CompletedTask = match serde_json::from_value(payload.task_data) {
            Ok(task) => task,
            Err(err) => return self.fail(task_id, err.to_string()),
        };
        if task.recurrence.trim().is_empty() {
            return self.skip(task_id, SkipReason::NotRecurring);
        }
        if let Some(existing) = task.next_occurrence_id {
            return self.skip(task_id, SkipReason::AlreadyCreated(existing));
        }
        let pattern = match parse_recurrence(&task.recurrence) {
            Ok(pattern) => pattern,
            Err(err) => return self.fail(task_id, err.to_string()),
        };
        if !pattern.is_recurring() {
            return self.skip(task_id, SkipReason::NotRecurring);
        }
        let base = task.due_date.unwrap_or_else(|| self.clock.utc());
        let Some(due_date) = pattern.next_due_date(base) else {
            return self.skip(task_id, SkipReason::NoNextDate);
        };

        let request = NextOccurrenceRequest::after(task_id, task, due_date);
        match self.api.create_next_occurrence(&request).await {
            Ok(created) => {
                self.stats.record_created();
                tracing::info!(
                    task_id = %task_id,
                    next_task_id = %created,
                    due_date = %due_date,
                    "next occurrence created by worker"
                );
                HandlerOutcome::Handled
            }
            Err(err) if err.kind().is_retryable() => {
                self.stats.record_error();
                tracing::warn!(task_id = %task_id, error = %err, "next occurrence creation will be retried");
                HandlerOutcome::Retry(err.to_string())
            }
            Err(err) => self.fail(task_id, err.to_string()),
        }
    }
}
