//! Value types describing how a task repeats.

mod error;
mod pattern;

pub use error::RecurrenceParseError;
pub(crate) use pattern::weekday_from_name;
pub use pattern::{DayOfMonth, RecurrenceFrequency, RecurrencePattern, weekday_name};
