//! Error types for reminder validation and state changes.

use super::ReminderStatus;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reasons an offset description was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffsetParseError {
    /// The input was blank.
    #[error("reminder offset must not be empty")]
    Empty,

    /// No offset format matched.
    #[error(
        "Could not parse reminder offset: '{0}'. Try formats like '30 minutes before', '1 hour', '1 day before'"
    )]
    Unrecognised(String),

    /// The offset does not fit in minutes.
    #[error("reminder offset '{0}' is too large")]
    TooLarge(String),

    /// A stored offset string was malformed.
    #[error("invalid stored reminder offset: '{0}'")]
    InvalidStoredForm(String),
}

/// Errors returned while constructing or mutating reminders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReminderDomainError {
    /// A status change would move backwards or out of a terminal state.
    #[error("reminder cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ReminderStatus,
        /// Requested status.
        to: ReminderStatus,
    },

    /// The offset lies outside the configured bounds.
    #[error("Reminder must be between {min} and {max} minutes before due date, got {actual}")]
    OffsetOutOfRange {
        /// Smallest accepted offset.
        min: u32,
        /// Largest accepted offset.
        max: u32,
        /// Offset supplied.
        actual: u32,
    },

    /// More than one of `scheduled_at`, `offset_minutes`, `offset_string` was given.
    #[error("give exactly one of scheduled_at, offset_minutes, or offset_string")]
    AmbiguousSchedule,

    /// None of `scheduled_at`, `offset_minutes`, `offset_string` was given.
    #[error("one of scheduled_at, offset_minutes, or offset_string is required")]
    MissingSchedule,

    /// The resolved time is not in the future.
    #[error("reminder time {0} is not in the future")]
    ScheduleInPast(DateTime<Utc>),

    /// The offset could not be applied to the due date.
    #[error("reminder offset cannot be applied to the due date")]
    UnschedulableOffset,

    /// The offset text was invalid.
    #[error(transparent)]
    Offset(#[from] OffsetParseError),
}

/// Error returned while parsing reminder statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown reminder status: {0}")]
pub struct ParseReminderStatusError(pub String);
