//! Free-text recurrence parsing.
//!
//! Input is trimmed, lowercased, and whitespace-collapsed before matching.
//! Families are tried in order: canonical pattern strings, daily, weekly,
//! monthly. The first family that matches wins.

use super::domain::{
    DayOfMonth, RecurrencePattern, RecurrenceParseError, weekday_from_name,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals exercised by the parser tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("recurrence pattern literal should compile")
}

static DAILY: Lazy<Regex> = Lazy::new(|| compile(r"^(?:daily|every\s*day|each\s*day|everyday)$"));

static WEEKLY: Lazy<Regex> = Lazy::new(|| compile(r"^(?:weekly|every\s*week|each\s*week)$"));

static WEEKLY_ON_DAY: Lazy<Regex> =
    Lazy::new(|| compile(r"^(?:(?:every|each|on)\s+)?(?:weekly\s+on\s+)?([a-z]+?)s?$"));

static MONTHLY: Lazy<Regex> = Lazy::new(|| compile(r"^(?:monthly|every\s*month|each\s*month)$"));

static MONTHLY_ON_DAY: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"^(?:(?:every|each)\s+month\s+)?(?:on\s+)?(?:the\s+)?(?:day\s*)?(\d{1,2})(?:st|nd|rd|th)?(?:\s+(?:of\s+)?(?:the|every|each)\s+month)?$",
    )
});

static MONTHLY_LAST_DAY: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"^(?:(?:every|each)\s+month\s+)?(?:on\s+)?(?:the\s+)?(?:last\s*day|end\s*of\s*(?:the\s*)?month)(?:\s+(?:of\s+)?(?:the|every|each)\s+month)?$",
    )
});

/// Parses a human description of a recurrence rule.
///
/// Accepts phrases such as `daily`, `every day`, `weekly`, `every monday`,
/// `on fri`, `monthly`, `on the 15th`, `day 3`, `last day`, `end of month`,
/// and canonical pattern strings such as `weekly:monday`.
///
/// # Errors
///
/// Returns [`RecurrenceParseError::Empty`] for blank input,
/// [`RecurrenceParseError::DayOutOfRange`] for day anchors outside `1..=31`,
/// and [`RecurrenceParseError::Unrecognised`] when no family matches.
pub fn parse_recurrence(text: &str) -> Result<RecurrencePattern, RecurrenceParseError> {
    let normalised = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if normalised.is_empty() {
        return Err(RecurrenceParseError::Empty);
    }

    if let Ok(pattern) = RecurrencePattern::from_pattern_string(&normalised) {
        return Ok(pattern);
    }

    if DAILY.is_match(&normalised) {
        return Ok(RecurrencePattern::daily());
    }

    if let Some(pattern) = parse_weekly(&normalised) {
        return Ok(pattern);
    }

    if let Some(pattern) = parse_monthly(&normalised)? {
        return Ok(pattern);
    }

    Err(RecurrenceParseError::Unrecognised(text.trim().to_owned()))
}

fn parse_weekly(normalised: &str) -> Option<RecurrencePattern> {
    if WEEKLY.is_match(normalised) {
        return Some(RecurrencePattern::weekly(None));
    }
    let captures = WEEKLY_ON_DAY.captures(normalised)?;
    let day = weekday_from_name(captures.get(1)?.as_str())?;
    Some(RecurrencePattern::weekly(Some(day)))
}

fn parse_monthly(normalised: &str) -> Result<Option<RecurrencePattern>, RecurrenceParseError> {
    if MONTHLY.is_match(normalised) {
        return Ok(Some(RecurrencePattern::monthly(None)));
    }
    if MONTHLY_LAST_DAY.is_match(normalised) {
        return Ok(Some(RecurrencePattern::monthly(Some(DayOfMonth::LAST))));
    }
    let Some(day) = MONTHLY_ON_DAY
        .captures(normalised)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
    else {
        return Ok(None);
    };
    if !(1..=31).contains(&day) {
        return Err(RecurrenceParseError::DayOutOfRange(day));
    }
    Ok(Some(RecurrencePattern::monthly(Some(DayOfMonth::new(day)?))))
}

/// A selectable recurrence choice for task forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecurrenceOption {
    /// Canonical pattern string.
    pub value: &'static str,
    /// Human label.
    pub label: &'static str,
}

/// Common recurrence choices offered by task editors.
pub const RECURRENCE_OPTIONS: &[RecurrenceOption] = &[
    RecurrenceOption {
        value: "none",
        label: "Does not repeat",
    },
    RecurrenceOption {
        value: "daily",
        label: "Daily",
    },
    RecurrenceOption {
        value: "weekly",
        label: "Weekly",
    },
    RecurrenceOption {
        value: "weekly:monday",
        label: "Every Monday",
    },
    RecurrenceOption {
        value: "weekly:friday",
        label: "Every Friday",
    },
    RecurrenceOption {
        value: "monthly",
        label: "Monthly",
    },
    RecurrenceOption {
        value: "monthly:1",
        label: "First of every month",
    },
    RecurrenceOption {
        value: "monthly:15",
        label: "15th of every month",
    },
    RecurrenceOption {
        value: "monthly:0",
        label: "Last day of every month",
    },
];
