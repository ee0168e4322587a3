//! Handling of scheduler callbacks for fired reminder jobs.

use crate::events::{CorrelationId, EventPublisher, EventType, ReminderEventPayload};
use crate::reminder::{
    domain::{JobTrigger, REMINDER_JOB_TYPE, ReminderId, ReminderStatus},
    ports::{ReminderRepository, ReminderRepositoryError},
};
use crate::task::{
    domain::TaskId,
    ports::{TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Why a trigger was acknowledged without publishing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The job carried a type other than `reminder`.
    UnknownJobType(String),
    /// The reminder no longer exists.
    ReminderNotFound(ReminderId),
    /// The reminder was already sent, failed, or cancelled.
    AlreadyProcessed(ReminderStatus),
}

impl IgnoreReason {
    /// Stable label reported to the scheduler.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownJobType(_) => "unknown_job_type",
            Self::ReminderNotFound(_) => "reminder_not_found",
            Self::AlreadyProcessed(_) => "already_processed",
        }
    }
}

/// Result of handling one trigger callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// `reminder.triggered` was published.
    Processed {
        /// Reminder that fired.
        reminder_id: ReminderId,
        /// Owning task.
        task_id: TaskId,
    },
    /// Nothing to do.
    Ignored(IgnoreReason),
    /// The callback lacked `task_id` or `reminder_id`.
    MissingFields,
    /// The reminder fired but the event could not be published.
    PublishFailed {
        /// Reminder that fired.
        reminder_id: ReminderId,
    },
}

impl TriggerOutcome {
    /// `processed`, `ignored`, or `error`.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Processed { .. } => "processed",
            Self::Ignored(_) => "ignored",
            Self::MissingFields | Self::PublishFailed { .. } => "error",
        }
    }

    /// Detail accompanying non-processed outcomes.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Processed { .. } => None,
            Self::Ignored(reason) => Some(reason.as_str()),
            Self::MissingFields => Some("missing_required_fields"),
            Self::PublishFailed { .. } => Some("failed_to_publish_event"),
        }
    }
}

/// Storage failures while handling a trigger.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Reminder storage failed.
    #[error(transparent)]
    Reminders(#[from] ReminderRepositoryError),
    /// Task storage failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
}

/// Turns fired jobs into `reminder.triggered` events.
///
/// The reminder stays `pending` here. It becomes `sent` once the
/// notification service confirms delivery.
#[derive(Clone)]
pub struct JobTriggerHandler<R, T>
where
    R: ReminderRepository,
    T: TaskRepository,
{
    reminders: Arc<R>,
    tasks: Arc<T>,
    events: EventPublisher,
}

impl<R, T> JobTriggerHandler<R, T>
where
    R: ReminderRepository,
    T: TaskRepository,
{
    /// Creates a trigger handler.
    #[must_use]
    pub const fn new(reminders: Arc<R>, tasks: Arc<T>, events: EventPublisher) -> Self {
        Self {
            reminders,
            tasks,
            events,
        }
    }

    /// Handles one trigger callback.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError`] only when storage fails. Malformed, stale,
    /// and duplicate callbacks are reported through [`TriggerOutcome`].
    pub async fn handle(&self, trigger: &JobTrigger) -> Result<TriggerOutcome, TriggerError> {
        let job_type = trigger.job_type.as_deref().unwrap_or_default();
        if job_type != REMINDER_JOB_TYPE {
            tracing::info!(job_type, "ignoring trigger for unknown job type");
            return Ok(TriggerOutcome::Ignored(IgnoreReason::UnknownJobType(
                job_type.to_owned(),
            )));
        }
        let (Some(task_id), Some(reminder_id)) = (trigger.task_id, trigger.reminder_id) else {
            tracing::warn!("reminder trigger missing task_id or reminder_id");
            return Ok(TriggerOutcome::MissingFields);
        };

        let Some(reminder) = self.reminders.find_by_id(reminder_id).await? else {
            tracing::info!(%reminder_id, "trigger for unknown reminder ignored");
            return Ok(TriggerOutcome::Ignored(IgnoreReason::ReminderNotFound(
                reminder_id,
            )));
        };
        if reminder.status().is_terminal() {
            tracing::info!(
                %reminder_id,
                status = %reminder.status(),
                "trigger for processed reminder ignored"
            );
            return Ok(TriggerOutcome::Ignored(IgnoreReason::AlreadyProcessed(
                reminder.status(),
            )));
        }

        let mut payload = ReminderEventPayload::for_reminder(&reminder).with_status("triggered");
        if let Some(task) = self.tasks.find_by_id(reminder.task_id()).await? {
            payload = payload.with_task(task.title().as_str(), task.due_date());
        }

        let published = self
            .events
            .publish_reminder_event(EventType::ReminderTriggered, payload, CorrelationId::new())
            .await;
        if !published {
            return Ok(TriggerOutcome::PublishFailed { reminder_id });
        }
        tracing::info!(%reminder_id, %task_id, "reminder triggered");
        Ok(TriggerOutcome::Processed {
            reminder_id,
            task_id: reminder.task_id(),
        })
    }
}
