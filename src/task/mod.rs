//! Tasks, their audit trail, and the chain of occurrences a repeating task
//! leaves behind.
//!
//! Completing a repeating task stores the completion and then creates the
//! next occurrence with an advanced due date, linked back through
//! `parent_task_id`. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
