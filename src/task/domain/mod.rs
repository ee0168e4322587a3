//! Domain model for to-do tasks.
//!
//! A task may repeat according to a [`RecurrencePattern`](crate::recurrence::RecurrencePattern).
//! Completing a repeating task yields a draft for its next occurrence, linked
//! back through `parent_task_id`. Every mutation is recorded as an immutable
//! [`AuditLogEntry`].

mod audit;
mod error;
mod ids;
mod tags;
mod task;

pub use audit::{AuditEventKind, AuditLogEntry};
pub use error::{ParsePriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{AuditEntryId, TaskId};
pub use tags::{MAX_TAGS, Tag, TagSet};
pub use task::{
    NewTask, PersistedTaskData, Priority, Task, TaskChanges, TaskStatus, TaskTitle,
};
