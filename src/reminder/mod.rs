//! Task reminders and their job scheduling.
//!
//! A reminder is stored first and then registered as a one-shot job with an
//! external scheduler. When the job fires, the scheduler calls back and a
//! `reminder.triggered` event is published for the notification service,
//! which reports `reminder.sent` or `reminder.failed` in return.
//!
//! - Domain types in [`domain`]
//! - Repository and scheduler ports in [`ports`]
//! - In-memory and sidecar HTTP adapters in [`adapters`]
//! - Scheduling, trigger, and delivery-outcome services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
