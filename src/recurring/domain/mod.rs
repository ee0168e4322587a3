//! Shapes exchanged by the recurring-task worker.

use crate::task::domain::{Priority, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of [`OccurrenceMetadata::created_by`] for worker-created tasks.
pub const CREATED_BY: &str = "recurring-task-service";

/// The parts of a completed task's snapshot the worker needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletedTask {
    /// Task title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Due date of the completed occurrence.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Canonical recurrence pattern string.
    #[serde(default)]
    pub recurrence: String,
    /// Set when the backend already created the next occurrence.
    #[serde(default)]
    pub next_occurrence_id: Option<TaskId>,
}

/// Provenance attached to a generated occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceMetadata {
    /// The completed task.
    pub parent_task_id: TaskId,
    /// Always `true` for worker-created tasks.
    #[serde(default)]
    pub auto_generated: bool,
    /// Creating component.
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Body sent to the backend's task-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextOccurrenceRequest {
    /// Title copied from the parent.
    pub title: String,
    /// Description copied from the parent.
    pub description: Option<String>,
    /// Priority copied from the parent.
    pub priority: Priority,
    /// Advanced due date.
    pub due_date: DateTime<Utc>,
    /// Recurrence copied from the parent.
    pub recurrence: String,
    /// Link back to the parent.
    pub metadata: OccurrenceMetadata,
}

impl NextOccurrenceRequest {
    /// Builds the request for the occurrence after `parent`.
    #[must_use]
    pub fn after(parent_task_id: TaskId, parent: CompletedTask, due_date: DateTime<Utc>) -> Self {
        Self {
            title: parent.title,
            description: parent.description,
            priority: parent.priority,
            due_date,
            recurrence: parent.recurrence,
            metadata: OccurrenceMetadata {
                parent_task_id,
                auto_generated: true,
                created_by: Some(CREATED_BY.to_owned()),
            },
        }
    }
}
