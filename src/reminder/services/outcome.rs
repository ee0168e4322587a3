//! Applies delivery results reported by the notification service.

use super::scheduling::reminder_job;
use crate::events::{
    BusMessage, CorrelationId, EventHandler, EventPublisher, EventType, HandlerOutcome,
    ReminderEventPayload,
};
use crate::reminder::{
    domain::{JobId, Reminder, ReminderPolicy},
    ports::{JobScheduler, ReminderRepository},
};
use crate::task::ports::TaskRepository;
use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;

const TASK_GONE: &str = "task no longer exists";

/// Consumes `reminder.sent` and `reminder.failed`.
///
/// A sent reminder becomes `sent`. A failed delivery is rescheduled with the
/// policy's backoff until `max_retries` is reached, then marked `failed`.
/// Events for reminders that are already terminal are acknowledged and
/// ignored, as are failures reported against an earlier attempt: the
/// payload's retry count and job id must match the stored reminder.
pub struct ReminderOutcomeHandler<R, T, J, C>
where
    R: ReminderRepository,
    T: TaskRepository,
    J: JobScheduler,
    C: Clock + Send + Sync,
{
    reminders: Arc<R>,
    tasks: Arc<T>,
    jobs: Arc<J>,
    events: EventPublisher,
    clock: Arc<C>,
    policy: ReminderPolicy,
}

impl<R, T, J, C> ReminderOutcomeHandler<R, T, J, C>
where
    R: ReminderRepository,
    T: TaskRepository,
    J: JobScheduler,
    C: Clock + Send + Sync,
{
    /// Creates an outcome handler.
    #[must_use]
    pub const fn new(
        reminders: Arc<R>,
        tasks: Arc<T>,
        jobs: Arc<J>,
        events: EventPublisher,
        clock: Arc<C>,
        policy: ReminderPolicy,
    ) -> Self {
        Self {
            reminders,
            tasks,
            jobs,
            events,
            clock,
            policy,
        }
    }

    async fn on_sent(&self, mut reminder: Reminder) -> HandlerOutcome {
        if let Err(err) = reminder.mark_sent(&*self.clock) {
            return HandlerOutcome::Drop(err.to_string());
        }
        match self.reminders.update(&reminder).await {
            Ok(()) => {
                tracing::info!(reminder_id = %reminder.id(), "reminder delivered");
                HandlerOutcome::Handled
            }
            Err(err) => HandlerOutcome::Retry(err.to_string()),
        }
    }

    async fn on_failed(&self, mut reminder: Reminder, error: String) -> HandlerOutcome {
        if !reminder.can_retry(self.policy.max_retries) {
            return self.give_up(reminder, error).await;
        }
        let task = match self.tasks.find_by_id(reminder.task_id()).await {
            Ok(Some(task)) => task,
            Ok(None) => return self.give_up(reminder, TASK_GONE.to_owned()).await,
            Err(err) => return HandlerOutcome::Retry(err.to_string()),
        };

        let attempt = reminder.retry_count().saturating_add(1);
        let delay = Duration::from_std(self.policy.backoff_for(attempt))
            .unwrap_or_else(|_| Duration::minutes(1));
        let now = self.clock.utc();
        let next_attempt_at = now.checked_add_signed(delay).unwrap_or(now);
        if let Err(err) = reminder.schedule_retry(next_attempt_at, error) {
            return HandlerOutcome::Drop(err.to_string());
        }

        let job = reminder_job(&reminder, &task);
        let (event_type, payload) = match self.jobs.schedule(&job).await {
            Ok(()) => {
                reminder.assign_job(job.job_id);
                tracing::info!(
                    reminder_id = %reminder.id(),
                    attempt,
                    next_attempt_at = %next_attempt_at,
                    "reminder delivery retry scheduled"
                );
                (
                    EventType::ReminderScheduled,
                    ReminderEventPayload::for_reminder(&reminder)
                        .with_task(task.title().as_str(), task.due_date()),
                )
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(
                    reminder_id = %reminder.id(),
                    failure = ?err.kind(),
                    error = %reason,
                    "retry scheduling failed"
                );
                if let Err(transition) = reminder.mark_failed(reason.clone()) {
                    return HandlerOutcome::Drop(transition.to_string());
                }
                (
                    EventType::ReminderFailed,
                    ReminderEventPayload::for_reminder(&reminder).with_error(reason),
                )
            }
        };

        if let Err(err) = self.reminders.update(&reminder).await {
            return HandlerOutcome::Retry(err.to_string());
        }
        self.events
            .publish_reminder_event(event_type, payload, CorrelationId::new())
            .await;
        HandlerOutcome::Handled
    }

    async fn give_up(&self, mut reminder: Reminder, error: String) -> HandlerOutcome {
        if let Err(err) = reminder.mark_failed(error) {
            return HandlerOutcome::Drop(err.to_string());
        }
        match self.reminders.update(&reminder).await {
            Ok(()) => {
                tracing::warn!(
                    reminder_id = %reminder.id(),
                    retries = reminder.retry_count(),
                    error = reminder.last_error().unwrap_or_default(),
                    "reminder delivery failed permanently"
                );
                HandlerOutcome::Handled
            }
            Err(err) => HandlerOutcome::Retry(err.to_string()),
        }
    }
}

fn is_stale(payload: &ReminderEventPayload, reminder: &Reminder) -> bool {
    payload.retry_count != reminder.retry_count()
        || payload.dapr_job_id.as_deref() != reminder.job_id().map(JobId::as_str)
}

#[async_trait]
impl<R, T, J, C> EventHandler for ReminderOutcomeHandler<R, T, J, C>
where
    R: ReminderRepository,
    T: TaskRepository,
    J: JobScheduler,
    C: Clock + Send + Sync,
{
    async fn handle(&self, message: &BusMessage) -> HandlerOutcome {
        let event_type = message.event_type();
        if !matches!(event_type, EventType::ReminderSent | EventType::ReminderFailed) {
            return HandlerOutcome::Handled;
        }
        let envelope = match message.decode::<ReminderEventPayload>() {
            Ok(envelope) => envelope,
            Err(err) => return HandlerOutcome::Drop(err.to_string()),
        };
        let payload = envelope.into_payload();
        let reminder = match self.reminders.find_by_id(payload.reminder_id).await {
            Ok(Some(reminder)) => reminder,
            Ok(None) => {
                tracing::info!(reminder_id = %payload.reminder_id, "outcome for unknown reminder ignored");
                return HandlerOutcome::Handled;
            }
            Err(err) => return HandlerOutcome::Retry(err.to_string()),
        };
        if reminder.status().is_terminal() {
            return HandlerOutcome::Handled;
        }

        if event_type == EventType::ReminderSent {
            self.on_sent(reminder).await
        } else if is_stale(&payload, &reminder) {
            tracing::info!(
                reminder_id = %reminder.id(),
                reported_attempt = payload.retry_count,
                current_attempt = reminder.retry_count(),
                "failure for an earlier attempt ignored"
            );
            HandlerOutcome::Handled
        } else {
            let error = payload
                .error
                .unwrap_or_else(|| "delivery failed".to_owned());
            self.on_failed(reminder, error).await
        }
    }
}
