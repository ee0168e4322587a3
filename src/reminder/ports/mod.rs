//! Port contracts for reminder persistence and job scheduling.

pub mod repository;
pub mod scheduler;

pub use repository::{ReminderRepository, ReminderRepositoryError, ReminderRepositoryResult};
pub use scheduler::{JobScheduler, JobSchedulerError, JobSchedulerResult};

#[cfg(test)]
pub use scheduler::MockJobScheduler;
