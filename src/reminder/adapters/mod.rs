//! Adapter implementations of the reminder ports.

pub mod http;
pub mod memory;

pub use http::HttpJobScheduler;
pub use memory::{InMemoryJobScheduler, InMemoryReminderRepository};
