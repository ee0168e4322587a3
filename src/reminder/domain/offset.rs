//! Reminder offsets.
//!
//! Human input (`30 minutes before`, `1 hour`, `2d`, `PT1H30M`) is parsed
//! into minutes plus a direction. Offsets persist in a compact form:
//! `-90m` before the due date, `+90m` after the reminder was created, `90m`
//! for an absolute reminder recorded relative to the due date for display
//! only.

use super::OffsetParseError;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 1_440;
const MINUTES_PER_WEEK: u32 = 10_080;

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals exercised by the offset tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("offset pattern literal should compile")
}

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"^(\d+)\s*(minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|wks?|w)(?:\s+(before|prior|earlier|after|later))?(?:\s+(?:the\s+)?due(?:\s+date)?)?$",
    )
});

static ISO_DURATION: Lazy<Regex> =
    Lazy::new(|| compile(r"^p(?:(\d+)w)?(?:(\d+)d)?(?:t(?:(\d+)h)?(?:(\d+)m)?)?$"));

static STORED: Lazy<Regex> = Lazy::new(|| compile(r"^([+-]?)(\d+)m$"));

/// What the offset minutes count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetDirection {
    /// Before the due date.
    BeforeDue,
    /// After the moment the reminder is created (`in 15 minutes`).
    AfterCreated,
    /// An explicit time; the minutes are informational.
    Absolute,
}

impl OffsetDirection {
    const fn suffix(self) -> &'static str {
        match self {
            Self::BeforeDue => " before",
            Self::AfterCreated => " after",
            Self::Absolute => "",
        }
    }
}

/// A parsed reminder offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderOffset {
    minutes: u32,
    direction: OffsetDirection,
}

impl ReminderOffset {
    /// Creates an offset.
    #[must_use]
    pub const fn new(minutes: u32, direction: OffsetDirection) -> Self {
        Self { minutes, direction }
    }

    /// Shorthand for an offset before the due date.
    #[must_use]
    pub const fn before_due(minutes: u32) -> Self {
        Self::new(minutes, OffsetDirection::BeforeDue)
    }

    /// Returns the offset magnitude in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Returns the direction.
    #[must_use]
    pub const fn direction(&self) -> OffsetDirection {
        self.direction
    }

    /// Human-readable form, e.g. `1h 30m before`.
    #[must_use]
    pub fn display(&self) -> String {
        format_offset_minutes(self.minutes, self.direction)
    }

    /// Computes the fire time for a task due at `due`, for a reminder
    /// created at `created_at`.
    ///
    /// Returns `None` for absolute offsets or when the result overflows.
    #[must_use]
    pub fn apply(&self, due: DateTime<Utc>, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let delta = Duration::minutes(i64::from(self.minutes));
        match self.direction {
            OffsetDirection::BeforeDue => due.checked_sub_signed(delta),
            OffsetDirection::AfterCreated => created_at.checked_add_signed(delta),
            OffsetDirection::Absolute => None,
        }
    }

    /// Compact persisted form: `-{m}m`, `+{m}m`, or `{m}m`.
    #[must_use]
    pub fn to_stored_string(&self) -> String {
        match self.direction {
            OffsetDirection::BeforeDue => format!("-{}m", self.minutes),
            OffsetDirection::AfterCreated => format!("+{}m", self.minutes),
            OffsetDirection::Absolute => format!("{}m", self.minutes),
        }
    }

    /// Parses the compact persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`OffsetParseError::InvalidStoredForm`] for anything else.
    pub fn from_stored_string(value: &str) -> Result<Self, OffsetParseError> {
        let invalid = || OffsetParseError::InvalidStoredForm(value.to_owned());
        let captures = STORED.captures(value.trim()).ok_or_else(invalid)?;
        let minutes = captures
            .get(2)
            .and_then(|digits| digits.as_str().parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let direction = match captures.get(1).map(|sign| sign.as_str()) {
            Some("-") => OffsetDirection::BeforeDue,
            Some("+") => OffsetDirection::AfterCreated,
            _ => OffsetDirection::Absolute,
        };
        Ok(Self::new(minutes, direction))
    }
}

impl fmt::Display for ReminderOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl TryFrom<String> for ReminderOffset {
    type Error = OffsetParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_stored_string(&value)
    }
}

impl From<ReminderOffset> for String {
    fn from(value: ReminderOffset) -> Self {
        value.to_stored_string()
    }
}

/// Parses a human offset description.
///
/// Bare durations (`1 hour`, `2d`) mean "before the due date"; `after`,
/// `later`, or a leading `in` (`in 15 minutes`) count from creation instead. ISO-8601 durations (`PT30M`, `P1DT2H`) and a
/// leading `a`/`an` (`an hour before`) are accepted too.
///
/// # Errors
///
/// Returns [`OffsetParseError::Empty`] for blank input,
/// [`OffsetParseError::TooLarge`] when the minutes overflow, and
/// [`OffsetParseError::Unrecognised`] when no format matches.
pub fn parse_reminder_offset(text: &str) -> Result<ReminderOffset, OffsetParseError> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let normalised = collapsed.to_lowercase();
    if normalised.is_empty() {
        return Err(OffsetParseError::Empty);
    }
    let (from_now, phrase) = normalised
        .strip_prefix("in ")
        .map_or((false, normalised.as_str()), |rest| (true, rest));
    let expanded = phrase
        .strip_prefix("an ")
        .or_else(|| phrase.strip_prefix("a "))
        .map_or_else(|| phrase.to_owned(), |rest| format!("1 {rest}"));

    if from_now {
        return match RELATIVE.captures(&expanded) {
            Some(captures) if captures.get(3).is_none() => relative_offset(&captures, text)
                .map(|offset| ReminderOffset::new(offset.minutes(), OffsetDirection::AfterCreated)),
            _ => Err(OffsetParseError::Unrecognised(text.trim().to_owned())),
        };
    }

    if let Some(captures) = RELATIVE.captures(&expanded) {
        return relative_offset(&captures, text);
    }
    if let Some(captures) = ISO_DURATION.captures(&expanded) {
        return iso_offset(&captures, text);
    }
    Err(OffsetParseError::Unrecognised(text.trim().to_owned()))
}

fn relative_offset(captures: &Captures<'_>, original: &str) -> Result<ReminderOffset, OffsetParseError> {
    let too_large = || OffsetParseError::TooLarge(original.trim().to_owned());
    let amount = captures
        .get(1)
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
        .ok_or_else(too_large)?;
    let unit = captures.get(2).map_or("m", |unit| unit.as_str());
    let per_unit = match unit.chars().next() {
        Some('h') => MINUTES_PER_HOUR,
        Some('d') => MINUTES_PER_DAY,
        Some('w') => MINUTES_PER_WEEK,
        _ => 1,
    };
    let minutes = amount.checked_mul(per_unit).ok_or_else(too_large)?;
    let direction = match captures.get(3).map(|word| word.as_str()) {
        Some("after" | "later") => OffsetDirection::AfterCreated,
        _ => OffsetDirection::BeforeDue,
    };
    Ok(ReminderOffset::new(minutes, direction))
}

fn iso_offset(captures: &Captures<'_>, original: &str) -> Result<ReminderOffset, OffsetParseError> {
    let components = [
        (1, MINUTES_PER_WEEK),
        (2, MINUTES_PER_DAY),
        (3, MINUTES_PER_HOUR),
        (4, 1),
    ];
    let mut total: u32 = 0;
    let mut matched_any = false;
    for (group, per_unit) in components {
        let Some(digits) = captures.get(group) else {
            continue;
        };
        matched_any = true;
        let part = digits
            .as_str()
            .parse::<u32>()
            .ok()
            .and_then(|amount| amount.checked_mul(per_unit))
            .and_then(|minutes| total.checked_add(minutes))
            .ok_or_else(|| OffsetParseError::TooLarge(original.trim().to_owned()))?;
        total = part;
    }
    if !matched_any {
        return Err(OffsetParseError::Unrecognised(original.trim().to_owned()));
    }
    Ok(ReminderOffset::before_due(total))
}

/// Formats minutes the way reminder lists display them.
///
/// Under an hour: `45 minutes before`. Under a day: `2 hours before` or
/// `1h 30m before`. Otherwise: `1 day before` or `1d 6h before`.
#[must_use]
pub fn format_offset_minutes(minutes: u32, direction: OffsetDirection) -> String {
    let suffix = direction.suffix();
    if minutes < MINUTES_PER_HOUR {
        return format!("{minutes} {}{suffix}", plural(minutes, "minute"));
    }
    if minutes < MINUTES_PER_DAY {
        let hours = minutes.div_euclid(MINUTES_PER_HOUR);
        let rest = minutes.rem_euclid(MINUTES_PER_HOUR);
        return if rest == 0 {
            format!("{hours} {}{suffix}", plural(hours, "hour"))
        } else {
            format!("{hours}h {rest}m{suffix}")
        };
    }
    let days = minutes.div_euclid(MINUTES_PER_DAY);
    let hours = minutes.rem_euclid(MINUTES_PER_DAY).div_euclid(MINUTES_PER_HOUR);
    if hours == 0 {
        format!("{days} {}{suffix}", plural(days, "day"))
    } else {
        format!("{days}d {hours}h{suffix}")
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        unit.to_owned()
    } else {
        format!("{unit}s")
    }
}
