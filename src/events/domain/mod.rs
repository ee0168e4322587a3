//! Event vocabulary, envelopes, and payloads.

mod envelope;
mod message;
mod payload;
mod topic;

pub use envelope::{CorrelationId, EventEnvelope, SCHEMA_VERSION, UserId};
pub use message::{BusMessage, EnvelopeError};
pub use payload::{ReminderEventPayload, TaskEventPayload};
pub use topic::{EventType, ParseEventTypeError, Topic};
