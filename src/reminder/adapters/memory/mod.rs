//! In-memory reminder storage and job scheduler.

mod reminder;
mod scheduler;

pub use reminder::InMemoryReminderRepository;
pub use scheduler::InMemoryJobScheduler;
