//! Reminder orchestration services.

mod outcome;
mod scheduling;
mod trigger;

pub use outcome::ReminderOutcomeHandler;
pub use scheduling::{
    CancelOutcome, CreateReminderRequest, ReminderCreation, ReminderSchedulingError,
    ReminderSchedulingResult, ReminderSchedulingService,
};
pub use trigger::{IgnoreReason, JobTriggerHandler, TriggerError, TriggerOutcome};
