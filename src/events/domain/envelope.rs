//! Common envelope wrapped around every published event.

use super::EventType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Envelope schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const fn default_version() -> u32 {
    SCHEMA_VERSION
}

/// Identifier threading one logical operation through every event it causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Creates a new random correlation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner of the tasks an event concerns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a user identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event as it appears on the bus.
///
/// Payload fields are flattened beside the envelope fields, so a task event
/// serialises as `{event_type, version, task_id, task_data, user_id,
/// timestamp, correlation_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<P> {
    event_type: EventType,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(flatten)]
    payload: P,
    user_id: UserId,
    timestamp: DateTime<Utc>,
    correlation_id: CorrelationId,
}

impl<P> EventEnvelope<P> {
    /// Wraps a payload.
    #[must_use]
    pub const fn new(
        event_type: EventType,
        payload: P,
        user_id: UserId,
        timestamp: DateTime<Utc>,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            event_type,
            version: SCHEMA_VERSION,
            payload,
            user_id,
            timestamp,
            correlation_id,
        }
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Returns the envelope schema version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Consumes the envelope, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Returns the user the event concerns.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns when the event was produced.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the correlation identifier.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}
