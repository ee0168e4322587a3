//! Topics and the closed set of event types published on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A message bus topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Task lifecycle events.
    #[serde(rename = "task-events")]
    TaskEvents,
    /// Reminder lifecycle events.
    #[serde(rename = "reminders")]
    Reminders,
    /// Fan-out of task events for live views.
    #[serde(rename = "task-updates")]
    TaskUpdates,
}

impl Topic {
    /// Returns the topic name on the bus.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskEvents => "task-events",
            Self::Reminders => "reminders",
            Self::TaskUpdates => "task-updates",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for event type strings outside the known vocabulary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown event type: {0}")]
pub struct ParseEventTypeError(pub String);

/// Every event type the system publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A task was created.
    #[serde(rename = "task.created")]
    TaskCreated,
    /// A task was edited.
    #[serde(rename = "task.updated")]
    TaskUpdated,
    /// A task was completed.
    #[serde(rename = "task.completed")]
    TaskCompleted,
    /// A task was deleted.
    #[serde(rename = "task.deleted")]
    TaskDeleted,
    /// A reminder job was registered with the scheduler.
    #[serde(rename = "reminder.scheduled")]
    ReminderScheduled,
    /// A reminder job fired.
    #[serde(rename = "reminder.triggered")]
    ReminderTriggered,
    /// A reminder reached the user.
    #[serde(rename = "reminder.sent")]
    ReminderSent,
    /// A reminder could not be scheduled or delivered.
    #[serde(rename = "reminder.failed")]
    ReminderFailed,
    /// A pending reminder was cancelled.
    #[serde(rename = "reminder.cancelled")]
    ReminderCancelled,
}

impl EventType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task.created",
            Self::TaskUpdated => "task.updated",
            Self::TaskCompleted => "task.completed",
            Self::TaskDeleted => "task.deleted",
            Self::ReminderScheduled => "reminder.scheduled",
            Self::ReminderTriggered => "reminder.triggered",
            Self::ReminderSent => "reminder.sent",
            Self::ReminderFailed => "reminder.failed",
            Self::ReminderCancelled => "reminder.cancelled",
        }
    }

    /// Returns the topic this event type is published on.
    #[must_use]
    pub const fn topic(self) -> Topic {
        match self {
            Self::TaskCreated | Self::TaskUpdated | Self::TaskCompleted | Self::TaskDeleted => {
                Topic::TaskEvents
            }
            Self::ReminderScheduled
            | Self::ReminderTriggered
            | Self::ReminderSent
            | Self::ReminderFailed
            | Self::ReminderCancelled => Topic::Reminders,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EventType {
    type Error = ParseEventTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "task.created" => Ok(Self::TaskCreated),
            "task.updated" => Ok(Self::TaskUpdated),
            "task.completed" => Ok(Self::TaskCompleted),
            "task.deleted" => Ok(Self::TaskDeleted),
            "reminder.scheduled" => Ok(Self::ReminderScheduled),
            "reminder.triggered" => Ok(Self::ReminderTriggered),
            "reminder.sent" => Ok(Self::ReminderSent),
            "reminder.failed" => Ok(Self::ReminderFailed),
            "reminder.cancelled" => Ok(Self::ReminderCancelled),
            _ => Err(ParseEventTypeError(value.to_owned())),
        }
    }
}
