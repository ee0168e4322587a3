//! Payloads carried inside [`EventEnvelope`](super::EventEnvelope)s.

use crate::reminder::domain::{Reminder, ReminderId, ReminderOffset};
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of `task.*` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEventPayload {
    /// Task the event concerns.
    pub task_id: TaskId,
    /// Snapshot of the task, plus event-specific fields such as
    /// `is_recurring` and `next_occurrence_id` on completion.
    pub task_data: Value,
}

/// Payload of `reminder.*` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEventPayload {
    /// Reminder the event concerns.
    pub reminder_id: ReminderId,
    /// Task the reminder belongs to.
    pub task_id: TaskId,
    /// When the reminder is or was due to fire.
    pub scheduled_at: DateTime<Utc>,
    /// Title of the task, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_title: Option<String>,
    /// Due date of the task, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Human-readable offset, such as `1 hour before`.
    #[serde(default)]
    pub reminder_offset: Option<String>,
    /// Scheduler job identifier.
    #[serde(default)]
    pub dapr_job_id: Option<String>,
    /// Status label at the time of the event.
    pub status: String,
    /// Delivery attempts already retried.
    #[serde(default)]
    pub retry_count: u32,
    /// Failure description for `reminder.failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReminderEventPayload {
    /// Describes `reminder` using its current status label.
    #[must_use]
    pub fn for_reminder(reminder: &Reminder) -> Self {
        Self {
            reminder_id: reminder.id(),
            task_id: reminder.task_id(),
            scheduled_at: reminder.scheduled_at(),
            task_title: None,
            due_date: None,
            reminder_offset: reminder.offset().map(ReminderOffset::display),
            dapr_job_id: reminder.job_id().map(|job_id| job_id.as_str().to_owned()),
            status: reminder.status().as_str().to_owned(),
            retry_count: reminder.retry_count(),
            error: None,
        }
    }

    /// Overrides the status label.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Attaches task details.
    #[must_use]
    pub fn with_task(mut self, title: impl Into<String>, due_date: Option<DateTime<Utc>>) -> Self {
        self.task_title = Some(title.into());
        self.due_date = due_date;
        self
    }

    /// Attaches a failure description.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
