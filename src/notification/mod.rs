//! Real-time delivery of fired reminders to connected users.
//!
//! The notification service keeps a registry of live delivery channels per
//! user (one per open WebSocket) and consumes `reminder.triggered` events
//! from the `reminders` topic. Each delivery attempt is reported back to the
//! backend as `reminder.sent` or `reminder.failed`, which drives the
//! reminder's retry policy.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
