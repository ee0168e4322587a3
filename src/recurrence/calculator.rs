//! Next-occurrence arithmetic for recurring tasks.

use super::domain::{DayOfMonth, RecurrenceFrequency, RecurrencePattern};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};

/// Upper bound on [`upcoming_occurrences`] results.
pub const MAX_UPCOMING_OCCURRENCES: usize = 52;

/// Upper bound on [`occurrences_until`] results.
pub const MAX_OCCURRENCES_UNTIL: usize = 366;

/// Computes the occurrence following `current`.
///
/// The time of day is carried over unchanged. Weekly rules advance to the
/// next matching weekday strictly after `current` (a full week when the
/// weekday already matches). Monthly rules land in the following calendar
/// month, clamping the anchor to that month's length; an anchor of `0` always
/// selects the last day.
///
/// Returns `None` for [`RecurrenceFrequency::None`] or when the result would
/// leave the representable date range.
#[must_use]
pub fn calculate_next_due_date(
    current: DateTime<Utc>,
    frequency: RecurrenceFrequency,
    day_of_week: Option<Weekday>,
    day_of_month: Option<DayOfMonth>,
) -> Option<DateTime<Utc>> {
    match frequency {
        RecurrenceFrequency::None => None,
        RecurrenceFrequency::Daily => current.checked_add_signed(Duration::days(1)),
        RecurrenceFrequency::Weekly => next_weekly(current, day_of_week),
        RecurrenceFrequency::Monthly => next_monthly(current, day_of_month),
    }
}

fn next_weekly(current: DateTime<Utc>, target: Option<Weekday>) -> Option<DateTime<Utc>> {
    let current_day = i64::from(current.weekday().num_days_from_monday());
    let target_day = target.map_or(current_day, |day| i64::from(day.num_days_from_monday()));
    let mut days_ahead = target_day - current_day;
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    current.checked_add_signed(Duration::days(days_ahead))
}

fn next_monthly(current: DateTime<Utc>, target: Option<DayOfMonth>) -> Option<DateTime<Utc>> {
    let first_of_next = current
        .date_naive()
        .with_day(1)?
        .checked_add_months(Months::new(1))?;
    let length = days_in_month(first_of_next)?;
    let day = match target {
        Some(anchor) => anchor.resolve(length),
        None => current.day().min(length),
    };
    let date = first_of_next.with_day(day)?;
    Some(date.and_time(current.time()).and_utc())
}

/// Number of days in the month containing `date`.
#[must_use]
pub fn days_in_month(date: NaiveDate) -> Option<u32> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
        .map(|last| last.day())
}

/// Lists up to `count` occurrences after `start`, capped at
/// [`MAX_UPCOMING_OCCURRENCES`].
#[must_use]
pub fn upcoming_occurrences(
    start: DateTime<Utc>,
    pattern: &RecurrencePattern,
    count: usize,
) -> Vec<DateTime<Utc>> {
    successors(start, pattern)
        .take(count.min(MAX_UPCOMING_OCCURRENCES))
        .collect()
}

/// Lists occurrences after `start` up to and including `end`, capped at
/// [`MAX_OCCURRENCES_UNTIL`].
#[must_use]
pub fn occurrences_until(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    pattern: &RecurrencePattern,
) -> Vec<DateTime<Utc>> {
    successors(start, pattern)
        .take_while(|occurrence| *occurrence <= end)
        .take(MAX_OCCURRENCES_UNTIL)
        .collect()
}

fn successors(
    start: DateTime<Utc>,
    pattern: &RecurrencePattern,
) -> impl Iterator<Item = DateTime<Utc>> + '_ {
    std::iter::successors(pattern.next_due_date(start), move |previous| {
        pattern.next_due_date(*previous)
    })
}
