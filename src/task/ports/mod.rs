//! Port contracts for task persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod audit;
pub mod repository;

pub use audit::{AuditLogError, AuditLogRepository, AuditLogResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};

#[cfg(test)]
pub use audit::MockAuditLogRepository;
#[cfg(test)]
pub use repository::MockTaskRepository;
