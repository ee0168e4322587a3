//! Domain model for task reminders.
//!
//! A reminder fires once at an absolute `scheduled_at` instant, usually
//! derived from the owning task's due date and an offset such as
//! `1 hour before`. Status moves forward only: `pending` to `sent`,
//! `failed`, or `cancelled`.

mod error;
mod ids;
mod job;
mod offset;
mod policy;
mod reminder;
mod schedule;

pub use error::{OffsetParseError, ParseReminderStatusError, ReminderDomainError};
pub use ids::{JobId, ReminderId};
pub use job::{JobData, JobStatus, JobTrigger, REMINDER_JOB_TYPE, ReminderJob};
pub use offset::{OffsetDirection, ReminderOffset, format_offset_minutes, parse_reminder_offset};
pub use policy::ReminderPolicy;
pub use reminder::{NewReminder, PersistedReminderData, Reminder, ReminderStatus};
pub use schedule::{ReminderSchedule, ResolvedSchedule};
