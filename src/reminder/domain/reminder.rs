//! Reminder aggregate root.

use super::{JobId, ParseReminderStatusError, ReminderDomainError, ReminderId, ReminderOffset};
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery status of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    /// Waiting to fire or being retried.
    Pending,
    /// Delivered to the user; terminal.
    Sent,
    /// Could not be scheduled, or delivery retries ran out; terminal.
    Failed,
    /// Cancelled before firing; terminal.
    Cancelled,
}

impl ReminderStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for every status except `pending`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns whether `self -> next` is a permitted transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Sent | Self::Failed | Self::Cancelled)
        )
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReminderStatus {
    type Error = ParseReminderStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseReminderStatusError(value.to_owned())),
        }
    }
}

/// A reminder that has not been assigned a storage identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    task_id: TaskId,
    scheduled_at: DateTime<Utc>,
    offset: Option<ReminderOffset>,
    created_at: DateTime<Utc>,
}

impl NewReminder {
    /// Starts a pending reminder.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        scheduled_at: DateTime<Utc>,
        offset: Option<ReminderOffset>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            task_id,
            scheduled_at,
            offset,
            created_at: clock.utc(),
        }
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Materialises the reminder once storage has assigned an identifier.
    #[must_use]
    pub const fn into_reminder(self, id: ReminderId) -> Reminder {
        Reminder {
            id,
            task_id: self.task_id,
            scheduled_at: self.scheduled_at,
            offset: self.offset,
            status: ReminderStatus::Pending,
            job_id: None,
            retry_count: 0,
            last_error: None,
            created_at: self.created_at,
            sent_at: None,
        }
    }
}

/// Reminder aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    id: ReminderId,
    task_id: TaskId,
    scheduled_at: DateTime<Utc>,
    offset: Option<ReminderOffset>,
    status: ReminderStatus,
    job_id: Option<JobId>,
    retry_count: u32,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedReminderData {
    /// Persisted identifier.
    pub id: ReminderId,
    /// Persisted owning task.
    pub task_id: TaskId,
    /// Persisted fire time.
    pub scheduled_at: DateTime<Utc>,
    /// Persisted offset.
    pub offset: Option<ReminderOffset>,
    /// Persisted status.
    pub status: ReminderStatus,
    /// Persisted scheduler job handle.
    pub job_id: Option<JobId>,
    /// Persisted retry count.
    pub retry_count: u32,
    /// Persisted last failure.
    pub last_error: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted delivery timestamp.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Reminder {
    /// Reconstructs a reminder from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedReminderData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            scheduled_at: data.scheduled_at,
            offset: data.offset,
            status: data.status,
            job_id: data.job_id,
            retry_count: data.retry_count,
            last_error: data.last_error,
            created_at: data.created_at,
            sent_at: data.sent_at,
        }
    }

    /// Returns the reminder identifier.
    #[must_use]
    pub const fn id(&self) -> ReminderId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns when the reminder fires.
    #[must_use]
    pub const fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Returns how the fire time was derived, if from an offset.
    #[must_use]
    pub const fn offset(&self) -> Option<&ReminderOffset> {
        self.offset.as_ref()
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> ReminderStatus {
        self.status
    }

    /// Returns the scheduler job handle once scheduled.
    #[must_use]
    pub const fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    /// Returns how many delivery retries have been scheduled.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns the most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the reminder was delivered.
    #[must_use]
    pub const fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    /// Returns `true` while another delivery attempt may be scheduled.
    #[must_use]
    pub const fn can_retry(&self, max_retries: u32) -> bool {
        matches!(self.status, ReminderStatus::Pending) && self.retry_count < max_retries
    }

    fn transition(&mut self, next: ReminderStatus) -> Result<(), ReminderDomainError> {
        if !self.status.can_transition_to(next) {
            return Err(ReminderDomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Records the scheduler job handle.
    pub fn assign_job(&mut self, job_id: JobId) {
        self.job_id = Some(job_id);
    }

    /// Marks the reminder delivered.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::InvalidTransition`] unless pending.
    pub fn mark_sent(&mut self, clock: &impl Clock) -> Result<(), ReminderDomainError> {
        self.transition(ReminderStatus::Sent)?;
        self.sent_at = Some(clock.utc());
        Ok(())
    }

    /// Marks the reminder failed.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::InvalidTransition`] unless pending.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), ReminderDomainError> {
        self.transition(ReminderStatus::Failed)?;
        self.last_error = Some(error.into());
        Ok(())
    }

    /// Cancels the reminder.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::InvalidTransition`] unless pending.
    pub fn cancel(&mut self) -> Result<(), ReminderDomainError> {
        self.transition(ReminderStatus::Cancelled)
    }

    /// Moves a pending reminder to a later fire time for another delivery
    /// attempt. The previous job handle is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::InvalidTransition`] unless pending.
    pub fn schedule_retry(
        &mut self,
        next_attempt_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Result<(), ReminderDomainError> {
        if self.status.is_terminal() {
            return Err(ReminderDomainError::InvalidTransition {
                from: self.status,
                to: ReminderStatus::Pending,
            });
        }
        self.retry_count += 1;
        self.scheduled_at = next_attempt_at;
        self.job_id = None;
        self.last_error = Some(error.into());
        Ok(())
    }
}
