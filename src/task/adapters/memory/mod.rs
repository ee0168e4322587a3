//! In-memory task and audit storage.

mod audit;
mod task;

pub use audit::InMemoryAuditLog;
pub use task::InMemoryTaskRepository;
