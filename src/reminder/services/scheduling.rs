//! Reminder creation, cancellation, and lookup.

use crate::events::{CorrelationId, EventPublisher, EventType, ReminderEventPayload};
use crate::reminder::{
    domain::{
        JobData, JobId, JobStatus, NewReminder, REMINDER_JOB_TYPE, Reminder, ReminderDomainError,
        ReminderId, ReminderJob, ReminderPolicy, ReminderSchedule,
    },
    ports::{
        JobScheduler, JobSchedulerError, ReminderRepository, ReminderRepositoryError,
    },
};
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a reminder.
///
/// Exactly one of `scheduled_at`, `offset_minutes`, or `offset_string` must
/// be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReminderRequest {
    task_id: TaskId,
    scheduled_at: Option<DateTime<Utc>>,
    offset_minutes: Option<u32>,
    offset_string: Option<String>,
}

impl CreateReminderRequest {
    /// Starts a request for `task_id`.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            scheduled_at: None,
            offset_minutes: None,
            offset_string: None,
        }
    }

    /// Fires at an explicit instant.
    #[must_use]
    pub const fn with_scheduled_at(mut self, scheduled_at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(scheduled_at);
        self
    }

    /// Fires a number of minutes before the due date.
    #[must_use]
    pub const fn with_offset_minutes(mut self, offset_minutes: u32) -> Self {
        self.offset_minutes = Some(offset_minutes);
        self
    }

    /// Fires at a human offset such as `1 day before`.
    #[must_use]
    pub fn with_offset_string(mut self, offset_string: impl Into<String>) -> Self {
        self.offset_string = Some(offset_string.into());
        self
    }
}

/// Result of [`ReminderSchedulingService::create_reminder`].
///
/// The reminder is persisted even when scheduling fails; it is then
/// `failed` and `scheduling_error` says why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderCreation {
    /// The stored reminder.
    pub reminder: Reminder,
    /// Why the scheduler refused the job, if it did.
    pub scheduling_error: Option<String>,
    /// Whether the lifecycle event reached the bus.
    pub event_published: bool,
}

impl ReminderCreation {
    /// Scheduler job handle, when scheduling succeeded.
    #[must_use]
    pub const fn job_id(&self) -> Option<&JobId> {
        self.reminder.job_id()
    }
}

/// Result of [`ReminderSchedulingService::cancel_reminder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The reminder moved to `cancelled`.
    Cancelled {
        /// The updated reminder.
        reminder: Reminder,
        /// Whether the scheduler job was removed.
        job_deleted: bool,
        /// Whether the lifecycle event reached the bus.
        event_published: bool,
    },
    /// The reminder was already sent, failed, or cancelled; nothing changed.
    AlreadyTerminal(Reminder),
}

/// Service-level errors for reminder scheduling.
#[derive(Debug, Error)]
pub enum ReminderSchedulingError {
    /// The owning task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The reminder does not exist.
    #[error("reminder not found: {0}")]
    ReminderNotFound(ReminderId),

    /// The owning task has no due date to anchor the reminder.
    #[error("task {0} has no due date; reminders need one")]
    MissingDueDate(TaskId),

    /// Reminder input was invalid.
    #[error(transparent)]
    Domain(#[from] ReminderDomainError),

    /// Reminder storage failed.
    #[error(transparent)]
    Reminders(#[from] ReminderRepositoryError),

    /// Task storage failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// The scheduler could not be queried.
    #[error(transparent)]
    Scheduler(#[from] JobSchedulerError),
}

/// Result type for reminder scheduling operations.
pub type ReminderSchedulingResult<T> = Result<T, ReminderSchedulingError>;

/// Builds the scheduler job for a reminder's current fire time.
pub(crate) fn reminder_job(reminder: &Reminder, task: &Task) -> ReminderJob {
    ReminderJob {
        job_id: JobId::for_reminder(
            task.id(),
            reminder.id(),
            reminder.scheduled_at(),
            reminder.retry_count(),
        ),
        due_time: reminder.scheduled_at(),
        data: JobData {
            job_type: REMINDER_JOB_TYPE.to_owned(),
            task_id: task.id(),
            reminder_id: reminder.id(),
            scheduled_at: reminder.scheduled_at(),
            task_title: task.title().as_str().to_owned(),
            task_description: task.description().map(str::to_owned),
            priority: task.priority().as_str().to_owned(),
            offset_minutes: reminder.offset().map(|offset| offset.minutes()),
        },
    }
}

/// Reminder scheduling orchestration service.
#[derive(Clone)]
pub struct ReminderSchedulingService<T, R, J, C>
where
    T: TaskRepository,
    R: ReminderRepository,
    J: JobScheduler,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    reminders: Arc<R>,
    jobs: Arc<J>,
    events: EventPublisher,
    clock: Arc<C>,
    policy: ReminderPolicy,
}

impl<T, R, J, C> ReminderSchedulingService<T, R, J, C>
where
    T: TaskRepository,
    R: ReminderRepository,
    J: JobScheduler,
    C: Clock + Send + Sync,
{
    /// Creates a new reminder scheduling service.
    #[must_use]
    pub const fn new(
        tasks: Arc<T>,
        reminders: Arc<R>,
        jobs: Arc<J>,
        events: EventPublisher,
        clock: Arc<C>,
        policy: ReminderPolicy,
    ) -> Self {
        Self {
            tasks,
            reminders,
            jobs,
            events,
            clock,
            policy,
        }
    }

    /// Creates a reminder and registers its job with the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderSchedulingError`] when the task is missing or has no
    /// due date, the schedule input is invalid, or storage fails. Scheduler
    /// failures are not errors; see [`ReminderCreation::scheduling_error`].
    pub async fn create_reminder(
        &self,
        request: CreateReminderRequest,
    ) -> ReminderSchedulingResult<ReminderCreation> {
        let schedule = ReminderSchedule::from_parts(
            request.scheduled_at,
            request.offset_minutes,
            request.offset_string,
        )?;
        let task = self
            .tasks
            .find_by_id(request.task_id)
            .await?
            .ok_or(ReminderSchedulingError::TaskNotFound(request.task_id))?;
        let due = task
            .due_date()
            .ok_or(ReminderSchedulingError::MissingDueDate(task.id()))?;
        let resolved = schedule.resolve(due, self.clock.utc(), &self.policy)?;

        let mut reminder = self
            .reminders
            .insert(NewReminder::new(
                task.id(),
                resolved.scheduled_at,
                resolved.offset,
                &*self.clock,
            ))
            .await?;

        let job = reminder_job(&reminder, &task);
        let correlation_id = CorrelationId::new();
        match self.jobs.schedule(&job).await {
            Ok(()) => {
                reminder.assign_job(job.job_id);
                self.reminders.update(&reminder).await?;
                tracing::info!(
                    reminder_id = %reminder.id(),
                    task_id = %task.id(),
                    scheduled_at = %reminder.scheduled_at(),
                    "reminder scheduled"
                );
                let payload = ReminderEventPayload::for_reminder(&reminder)
                    .with_task(task.title().as_str(), task.due_date());
                let event_published = self
                    .events
                    .publish_reminder_event(EventType::ReminderScheduled, payload, correlation_id)
                    .await;
                Ok(ReminderCreation {
                    reminder,
                    scheduling_error: None,
                    event_published,
                })
            }
            Err(err) => {
                let error = err.to_string();
                tracing::warn!(
                    reminder_id = %reminder.id(),
                    task_id = %task.id(),
                    failure = ?err.kind(),
                    error = %error,
                    "reminder job scheduling failed"
                );
                reminder.mark_failed(error.clone())?;
                self.reminders.update(&reminder).await?;
                let payload = ReminderEventPayload::for_reminder(&reminder)
                    .with_task(task.title().as_str(), task.due_date())
                    .with_error(error.clone());
                let event_published = self
                    .events
                    .publish_reminder_event(EventType::ReminderFailed, payload, correlation_id)
                    .await;
                Ok(ReminderCreation {
                    reminder,
                    scheduling_error: Some(error),
                    event_published,
                })
            }
        }
    }

    /// Cancels a pending reminder and removes its scheduler job.
    ///
    /// The local cancellation stands even if the job cannot be removed; a
    /// stale job that still fires is ignored by the trigger handler.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderSchedulingError::ReminderNotFound`] for unknown ids
    /// or a storage error.
    pub async fn cancel_reminder(
        &self,
        reminder_id: ReminderId,
    ) -> ReminderSchedulingResult<CancelOutcome> {
        let mut reminder = self.find_required(reminder_id).await?;
        if reminder.status().is_terminal() {
            return Ok(CancelOutcome::AlreadyTerminal(reminder));
        }

        reminder.cancel()?;
        self.reminders.update(&reminder).await?;

        let job_deleted = match reminder.job_id() {
            Some(job_id) => match self.jobs.delete(job_id).await {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        reminder_id = %reminder.id(),
                        job_id = %job_id,
                        error = %err,
                        "failed to delete job for cancelled reminder"
                    );
                    false
                }
            },
            None => false,
        };

        let event_published = self
            .events
            .publish_reminder_event(
                EventType::ReminderCancelled,
                ReminderEventPayload::for_reminder(&reminder),
                CorrelationId::new(),
            )
            .await;

        Ok(CancelOutcome::Cancelled {
            reminder,
            job_deleted,
            event_published,
        })
    }

    /// Finds a reminder by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderSchedulingError::Reminders`] when storage fails.
    pub async fn find_reminder(
        &self,
        reminder_id: ReminderId,
    ) -> ReminderSchedulingResult<Option<Reminder>> {
        Ok(self.reminders.find_by_id(reminder_id).await?)
    }

    /// Lists a task's reminders ordered by fire time.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderSchedulingError::Reminders`] when storage fails.
    pub async fn reminders_for_task(
        &self,
        task_id: TaskId,
    ) -> ReminderSchedulingResult<Vec<Reminder>> {
        Ok(self.reminders.find_by_task(task_id).await?)
    }

    /// Asks the scheduler about a reminder's job.
    ///
    /// Returns `None` when the reminder has no job or the scheduler no longer
    /// knows it.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderSchedulingError`] for unknown reminders, storage
    /// failures, or scheduler failures.
    pub async fn job_status(
        &self,
        reminder_id: ReminderId,
    ) -> ReminderSchedulingResult<Option<JobStatus>> {
        let reminder = self.find_required(reminder_id).await?;
        match reminder.job_id() {
            Some(job_id) => Ok(self.jobs.status(job_id).await?),
            None => Ok(None),
        }
    }

    /// Removes every reminder of a task, deleting pending jobs on the way.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderSchedulingError::Reminders`] when storage fails.
    pub async fn purge_task_reminders(&self, task_id: TaskId) -> ReminderSchedulingResult<usize> {
        for reminder in self.reminders.find_by_task(task_id).await? {
            if reminder.status().is_terminal() {
                continue;
            }
            if let Some(job_id) = reminder.job_id()
                && let Err(err) = self.jobs.delete(job_id).await
            {
                tracing::warn!(
                    reminder_id = %reminder.id(),
                    job_id = %job_id,
                    error = %err,
                    "failed to delete job while purging reminders"
                );
            }
        }
        Ok(self.reminders.delete_for_task(task_id).await?)
    }

    async fn find_required(&self, reminder_id: ReminderId) -> ReminderSchedulingResult<Reminder> {
        self.reminders
            .find_by_id(reminder_id)
            .await?
            .ok_or(ReminderSchedulingError::ReminderNotFound(reminder_id))
    }
}
