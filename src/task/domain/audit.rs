//! Append-only audit trail of task mutations.

use super::{AuditEntryId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEventKind {
    /// A task was created.
    #[serde(rename = "task.created")]
    TaskCreated,
    /// A task was edited.
    #[serde(rename = "task.updated")]
    TaskUpdated,
    /// A task was completed.
    #[serde(rename = "task.completed")]
    TaskCompleted,
    /// Completing a repeating task did not yield its next occurrence.
    #[serde(rename = "task.next_occurrence_failed")]
    NextOccurrenceFailed,
}

impl AuditEventKind {
    /// Returns the stored event type string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task.created",
            Self::TaskUpdated => "task.updated",
            Self::TaskCompleted => "task.completed",
            Self::NextOccurrenceFailed => "task.next_occurrence_failed",
        }
    }
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a task mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    id: AuditEntryId,
    event_type: AuditEventKind,
    task_id: TaskId,
    parent_task_id: Option<TaskId>,
    user_id: Option<String>,
    event_data: Value,
    created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Records an event against a task.
    #[must_use]
    pub fn record(
        event_type: AuditEventKind,
        task_id: TaskId,
        event_data: Value,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            event_type,
            task_id,
            parent_task_id: None,
            user_id: None,
            event_data,
            created_at: clock.utc(),
        }
    }

    /// Links the entry to the previous occurrence of the task.
    #[must_use]
    pub const fn with_parent(mut self, parent_task_id: Option<TaskId>) -> Self {
        self.parent_task_id = parent_task_id;
        self
    }

    /// Attributes the entry to a user.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> AuditEntryId {
        self.id
    }

    /// Returns the recorded event kind.
    #[must_use]
    pub const fn event_type(&self) -> AuditEventKind {
        self.event_type
    }

    /// Returns the task the entry belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the parent task, if recorded.
    #[must_use]
    pub const fn parent_task_id(&self) -> Option<TaskId> {
        self.parent_task_id
    }

    /// Returns the acting user, if recorded.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the event payload.
    #[must_use]
    pub const fn event_data(&self) -> &Value {
        &self.event_data
    }

    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
