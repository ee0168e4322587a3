//! Recurring-task worker.
//!
//! Consumes `task.completed` events and makes sure a repeating task has its
//! next occurrence. The backend's completion flow normally creates it and
//! stamps `next_occurrence_id` on the event; the worker only steps in when
//! that id is missing, calling the backend's task-creation API, which is
//! idempotent per parent task.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
