//! Errors raised while interpreting recurrence input.

use thiserror::Error;

/// Reasons a recurrence description or pattern string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceParseError {
    /// The input was blank.
    #[error("Empty recurrence pattern")]
    Empty,

    /// No recurrence family matched the input.
    #[error("Could not parse recurrence pattern: '{0}'")]
    Unrecognised(String),

    /// A monthly anchor fell outside `1..=31`.
    #[error("day of month must be between 1 and 31, got {0}")]
    DayOutOfRange(u32),

    /// A weekly anchor was not a weekday name.
    #[error("unknown weekday: '{0}'")]
    UnknownWeekday(String),

    /// A stored pattern string did not follow `frequency[:anchor]`.
    #[error("invalid recurrence pattern string: '{0}'")]
    InvalidPatternString(String),
}
