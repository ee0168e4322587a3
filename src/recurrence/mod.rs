//! Recurrence patterns for repeating tasks.
//!
//! Free-text input such as "every monday" or "on the 15th" is parsed into a
//! [`RecurrencePattern`], persisted as a canonical pattern string
//! (`weekly:monday`, `monthly:15`, `monthly:0` for the last day), and advanced
//! one occurrence at a time by [`calculate_next_due_date`].

pub mod calculator;
pub mod domain;
pub mod parser;

#[cfg(test)]
mod tests;

pub use calculator::{
    MAX_OCCURRENCES_UNTIL, MAX_UPCOMING_OCCURRENCES, calculate_next_due_date, days_in_month,
    occurrences_until, upcoming_occurrences,
};
pub use domain::{DayOfMonth, RecurrenceFrequency, RecurrencePattern, RecurrenceParseError};
pub use parser::{RECURRENCE_OPTIONS, RecurrenceOption, parse_recurrence};
