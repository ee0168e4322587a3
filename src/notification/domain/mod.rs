//! Notification messages and connection identity.

use crate::events::ReminderEventPayload;
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one registered connection of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a registry-assigned number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a reminder fires ahead of the due date or after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// The task is not yet due.
    DueSoon,
    /// The due date has already passed.
    Overdue,
}

/// Frame pushed to a user's connections when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotification {
    /// Always `reminder`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Task being reminded about.
    pub task_id: TaskId,
    /// Title of the task.
    pub task_title: String,
    /// Due soon or overdue.
    pub reminder_type: ReminderKind,
    /// Text shown to the user.
    pub message: String,
    /// Due date of the task.
    pub due_date: Option<DateTime<Utc>>,
}

impl ReminderNotification {
    /// Builds the frame for a triggered reminder.
    #[must_use]
    pub fn from_payload(payload: &ReminderEventPayload) -> Self {
        let title = payload
            .task_title
            .clone()
            .unwrap_or_else(|| format!("Task {}", payload.task_id));
        let reminder_type = match payload.due_date {
            Some(due) if due <= payload.scheduled_at => ReminderKind::Overdue,
            _ => ReminderKind::DueSoon,
        };
        let message = match (&payload.reminder_offset, reminder_type) {
            (_, ReminderKind::Overdue) => format!("\"{title}\" is overdue"),
            (Some(offset), ReminderKind::DueSoon) => format!("Reminder: \"{title}\" ({offset})"),
            (None, ReminderKind::DueSoon) => format!("Reminder: \"{title}\""),
        };
        Self {
            kind: "reminder".to_owned(),
            task_id: payload.task_id,
            task_title: title,
            reminder_type,
            message,
            due_date: payload.due_date,
        }
    }
}
