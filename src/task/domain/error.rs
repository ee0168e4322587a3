//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The title exceeds the storage limit.
    #[error("task title must be at most {max} characters, got {actual}")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length supplied.
        actual: usize,
    },

    /// A tag was blank.
    #[error("tag must not be empty")]
    EmptyTag,

    /// A tag was shorter or longer than permitted.
    #[error("tag '{0}' must be between 2 and 50 characters including '#'")]
    TagLength(String),

    /// A tag contained characters outside `[a-z0-9_-]`.
    #[error("tag '{0}' may only contain letters, digits, '_' and '-'")]
    InvalidTag(String),

    /// Too many tags were supplied.
    #[error("a task may carry at most {max} tags, got {actual}")]
    TooManyTags {
        /// Maximum accepted tag count.
        max: usize,
        /// Distinct tags supplied.
        actual: usize,
    },

    /// The task has already been completed.
    #[error("task {0} is already completed")]
    AlreadyCompleted(TaskId),
}

/// Error returned while parsing priorities from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
