//! Canonical pattern string tests.

use crate::recurrence::{DayOfMonth, RecurrenceFrequency, RecurrencePattern, RecurrenceParseError};
use chrono::Weekday;
use rstest::rstest;

#[rstest]
#[case(RecurrencePattern::none(), "none")]
#[case(RecurrencePattern::daily(), "daily")]
#[case(RecurrencePattern::weekly(None), "weekly")]
#[case(RecurrencePattern::weekly(Some(Weekday::Thu)), "weekly:thursday")]
#[case(RecurrencePattern::monthly(None), "monthly")]
#[case(RecurrencePattern::monthly(Some(DayOfMonth::LAST)), "monthly:0")]
fn pattern_string_survives_storage(#[case] pattern: RecurrencePattern, #[case] stored: &str) {
    assert_eq!(pattern.to_pattern_string(), stored);
    let restored = RecurrencePattern::from_pattern_string(stored).expect("stored form should parse");
    assert_eq!(restored, pattern);
}

#[rstest]
fn last_day_anchor_is_preserved_through_storage() {
    let restored =
        RecurrencePattern::from_pattern_string("monthly:0").expect("last-day form should parse");
    assert_eq!(restored.day_of_month(), Some(DayOfMonth::LAST));
    assert!(restored.day_of_month().is_some_and(DayOfMonth::is_last));
}

#[rstest]
#[case("weekly:someday", RecurrenceParseError::UnknownWeekday("someday".to_owned()))]
#[case("monthly:40", RecurrenceParseError::DayOutOfRange(40))]
#[case("monthly:x", RecurrenceParseError::InvalidPatternString("monthly:x".to_owned()))]
#[case("daily:3", RecurrenceParseError::InvalidPatternString("daily:3".to_owned()))]
#[case("", RecurrenceParseError::Empty)]
fn malformed_pattern_strings_are_rejected(
    #[case] stored: &str,
    #[case] expected: RecurrenceParseError,
) {
    assert_eq!(RecurrencePattern::from_pattern_string(stored), Err(expected));
}

#[rstest]
fn only_none_is_non_recurring() {
    assert!(!RecurrencePattern::none().is_recurring());
    assert!(RecurrencePattern::daily().is_recurring());
    assert_eq!(RecurrencePattern::default().frequency(), RecurrenceFrequency::None);
}

#[rstest]
fn pattern_serialises_as_pattern_string() {
    let pattern = RecurrencePattern::weekly(Some(Weekday::Mon));
    let json = serde_json::to_value(pattern).expect("pattern should serialise");
    assert_eq!(json, serde_json::json!("weekly:monday"));
    let back: RecurrencePattern =
        serde_json::from_value(serde_json::json!("monthly:15")).expect("pattern should deserialise");
    assert_eq!(back.day_of_month().map(DayOfMonth::value), Some(15));
}
