//! Recurrence frequency, anchors, and the canonical pattern string.

use super::RecurrenceParseError;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    /// The task does not repeat.
    #[default]
    None,
    /// Every day at the same time.
    Daily,
    /// Every week, optionally on a fixed weekday.
    Weekly,
    /// Every month, optionally on a fixed day of the month.
    Monthly,
}

impl RecurrenceFrequency {
    /// Returns the canonical lowercase representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RecurrenceFrequency {
    type Error = RecurrenceParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(RecurrenceParseError::Unrecognised(value.to_owned())),
        }
    }
}

/// Day-of-month anchor for monthly recurrence.
///
/// `0` is reserved for "last day of the month"; other values lie in `1..=31`
/// and are clamped to the length of the target month when resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfMonth(u8);

impl DayOfMonth {
    /// The last day of whichever month the occurrence falls in.
    pub const LAST: Self = Self(0);

    /// Creates an anchor from a numeric day, where `0` means the last day.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceParseError::DayOutOfRange`] when `day > 31`.
    pub const fn new(day: u32) -> Result<Self, RecurrenceParseError> {
        if day > 31 {
            return Err(RecurrenceParseError::DayOutOfRange(day));
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "day is bounded to 0..=31 above"
        )]
        let narrowed = day as u8;
        Ok(Self(narrowed))
    }

    /// Returns the stored value, `0` for the last day.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns `true` when this anchor means "last day of the month".
    #[must_use]
    pub const fn is_last(self) -> bool {
        self.0 == 0
    }

    /// Resolves the anchor against a month with `days_in_month` days.
    #[must_use]
    pub const fn resolve(self, days_in_month: u32) -> u32 {
        let day = self.0 as u32;
        if day == 0 || day > days_in_month {
            days_in_month
        } else {
            day
        }
    }
}

impl TryFrom<u8> for DayOfMonth {
    type Error = RecurrenceParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(u32::from(value))
    }
}

impl From<DayOfMonth> for u8 {
    fn from(value: DayOfMonth) -> Self {
        value.0
    }
}

/// A parsed recurrence rule.
///
/// Weekly patterns never carry a day-of-month anchor and monthly patterns
/// never carry a weekday. Serialises as its canonical pattern string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecurrencePattern {
    frequency: RecurrenceFrequency,
    day_of_week: Option<Weekday>,
    day_of_month: Option<DayOfMonth>,
}

impl RecurrencePattern {
    /// A non-repeating task.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            frequency: RecurrenceFrequency::None,
            day_of_week: None,
            day_of_month: None,
        }
    }

    /// Repeats every day.
    #[must_use]
    pub const fn daily() -> Self {
        Self {
            frequency: RecurrenceFrequency::Daily,
            day_of_week: None,
            day_of_month: None,
        }
    }

    /// Repeats every week, on `day_of_week` when given.
    #[must_use]
    pub const fn weekly(day_of_week: Option<Weekday>) -> Self {
        Self {
            frequency: RecurrenceFrequency::Weekly,
            day_of_week,
            day_of_month: None,
        }
    }

    /// Repeats every month, on `day_of_month` when given.
    #[must_use]
    pub const fn monthly(day_of_month: Option<DayOfMonth>) -> Self {
        Self {
            frequency: RecurrenceFrequency::Monthly,
            day_of_week: None,
            day_of_month,
        }
    }

    /// Returns the frequency.
    #[must_use]
    pub const fn frequency(&self) -> RecurrenceFrequency {
        self.frequency
    }

    /// Returns the weekly anchor, if any.
    #[must_use]
    pub const fn day_of_week(&self) -> Option<Weekday> {
        self.day_of_week
    }

    /// Returns the monthly anchor, if any.
    #[must_use]
    pub const fn day_of_month(&self) -> Option<DayOfMonth> {
        self.day_of_month
    }

    /// Returns `true` unless the frequency is [`RecurrenceFrequency::None`].
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        !matches!(self.frequency, RecurrenceFrequency::None)
    }

    /// Computes the occurrence that follows `current`.
    ///
    /// Returns `None` for non-repeating patterns.
    #[must_use]
    pub fn next_due_date(&self, current: DateTime<Utc>) -> Option<DateTime<Utc>> {
        crate::recurrence::calculate_next_due_date(
            current,
            self.frequency,
            self.day_of_week,
            self.day_of_month,
        )
    }

    /// Renders the canonical pattern string (`none`, `daily`, `weekly`,
    /// `weekly:<day>`, `monthly`, `monthly:<n>`).
    #[must_use]
    pub fn to_pattern_string(&self) -> String {
        match (self.frequency, self.day_of_week, self.day_of_month) {
            (RecurrenceFrequency::Weekly, Some(day), _) => format!("weekly:{}", weekday_name(day)),
            (RecurrenceFrequency::Monthly, _, Some(day)) => format!("monthly:{}", day.value()),
            (frequency, _, _) => frequency.as_str().to_owned(),
        }
    }

    /// Parses a canonical pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceParseError`] when the string is empty, names an
    /// unknown frequency or weekday, or carries an out-of-range day.
    pub fn from_pattern_string(value: &str) -> Result<Self, RecurrenceParseError> {
        let normalised = value.trim().to_ascii_lowercase();
        if normalised.is_empty() {
            return Err(RecurrenceParseError::Empty);
        }

        let (frequency, anchor) = match normalised.split_once(':') {
            Some((frequency, anchor)) => (frequency, Some(anchor)),
            None => (normalised.as_str(), None),
        };

        match (frequency, anchor) {
            ("none", None) => Ok(Self::none()),
            ("daily", None) => Ok(Self::daily()),
            ("weekly", None) => Ok(Self::weekly(None)),
            ("weekly", Some(day)) => weekday_from_name(day)
                .map(|weekday| Self::weekly(Some(weekday)))
                .ok_or_else(|| RecurrenceParseError::UnknownWeekday(day.to_owned())),
            ("monthly", None) => Ok(Self::monthly(None)),
            ("monthly", Some(day)) => {
                let parsed = day
                    .parse::<u32>()
                    .map_err(|_| RecurrenceParseError::InvalidPatternString(value.to_owned()))?;
                Ok(Self::monthly(Some(DayOfMonth::new(parsed)?)))
            }
            _ => Err(RecurrenceParseError::InvalidPatternString(value.to_owned())),
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pattern_string())
    }
}

impl FromStr for RecurrencePattern {
    type Err = RecurrenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_pattern_string(s)
    }
}

impl TryFrom<String> for RecurrencePattern {
    type Error = RecurrenceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_pattern_string(&value)
    }
}

impl From<RecurrencePattern> for String {
    fn from(value: RecurrencePattern) -> Self {
        value.to_pattern_string()
    }
}

/// Full lowercase weekday name used in pattern strings.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Looks up a weekday by full name or common abbreviation.
pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}
