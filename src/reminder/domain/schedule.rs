//! Resolution of reminder input into an absolute fire time.

use super::{
    OffsetDirection, ReminderDomainError, ReminderOffset, ReminderPolicy, parse_reminder_offset,
};
use chrono::{DateTime, Utc};

/// The one way a caller said when a reminder should fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderSchedule {
    /// An explicit instant.
    At(DateTime<Utc>),
    /// Minutes before the due date.
    OffsetMinutes(u32),
    /// A human offset such as `1 day before`.
    OffsetText(String),
}

/// A validated fire time plus how it was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchedule {
    /// When the reminder fires.
    pub scheduled_at: DateTime<Utc>,
    /// How the fire time was derived, for display.
    pub offset: Option<ReminderOffset>,
}

impl ReminderSchedule {
    /// Picks the single schedule among optional inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::AmbiguousSchedule`] when more than one
    /// input is present and [`ReminderDomainError::MissingSchedule`] when
    /// none is.
    pub fn from_parts(
        scheduled_at: Option<DateTime<Utc>>,
        offset_minutes: Option<u32>,
        offset_string: Option<String>,
    ) -> Result<Self, ReminderDomainError> {
        match (scheduled_at, offset_minutes, offset_string) {
            (Some(at), None, None) => Ok(Self::At(at)),
            (None, Some(minutes), None) => Ok(Self::OffsetMinutes(minutes)),
            (None, None, Some(text)) => Ok(Self::OffsetText(text)),
            (None, None, None) => Err(ReminderDomainError::MissingSchedule),
            _ => Err(ReminderDomainError::AmbiguousSchedule),
        }
    }

    /// Resolves the fire time against a task's due date, with `now` as the
    /// creation time for offsets that count from creation.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError`] when the offset is unparseable or out
    /// of bounds, or the resolved time is not after `now`.
    pub fn resolve(
        &self,
        due: DateTime<Utc>,
        now: DateTime<Utc>,
        policy: &ReminderPolicy,
    ) -> Result<ResolvedSchedule, ReminderDomainError> {
        let resolved = match self {
            Self::At(at) => ResolvedSchedule {
                scheduled_at: *at,
                offset: u32::try_from((due - *at).num_minutes())
                    .ok()
                    .map(|minutes| ReminderOffset::new(minutes, OffsetDirection::Absolute)),
            },
            Self::OffsetMinutes(minutes) => {
                policy.check_offset(*minutes)?;
                Self::from_offset(ReminderOffset::before_due(*minutes), due, now)?
            }
            Self::OffsetText(text) => {
                let offset = parse_reminder_offset(text)?;
                policy.check_offset(offset.minutes())?;
                Self::from_offset(offset, due, now)?
            }
        };
        if resolved.scheduled_at <= now {
            return Err(ReminderDomainError::ScheduleInPast(resolved.scheduled_at));
        }
        Ok(resolved)
    }

    fn from_offset(
        offset: ReminderOffset,
        due: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ResolvedSchedule, ReminderDomainError> {
        let scheduled_at = offset
            .apply(due, now)
            .ok_or(ReminderDomainError::UnschedulableOffset)?;
        Ok(ResolvedSchedule {
            scheduled_at,
            offset: Some(offset),
        })
    }
}
