//! Domain events and the publish/subscribe plumbing around them.
//!
//! Events travel on three topics: `task-events` (task lifecycle),
//! `reminders` (reminder lifecycle), and `task-updates` (a fan-out of every
//! task event for live views). Each message is an [`EventEnvelope`] whose
//! payload fields are flattened next to the envelope fields.
//!
//! - Domain types in [`domain`]
//! - The message bus port in [`ports`]
//! - In-memory and sidecar HTTP buses in [`adapters`]
//! - Typed publishing and subscription loops in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

pub use domain::{
    BusMessage, CorrelationId, EnvelopeError, EventEnvelope, EventType, ReminderEventPayload,
    SCHEMA_VERSION, TaskEventPayload, Topic, UserId,
};
pub use ports::{MessageBus, PublishError, PublishResult};
pub use services::{EventHandler, EventPublisher, HandlerOutcome, run_subscription};
