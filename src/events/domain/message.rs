//! Untyped messages as they travel over a bus.

use super::{CorrelationId, EventEnvelope, EventType, Topic};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while converting between envelopes and bus messages.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The body was not valid envelope JSON.
    #[error("malformed event envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body had no recognisable `event_type`.
    #[error("event envelope has no recognised event_type")]
    MissingEventType,
}

/// A serialised envelope plus the routing facts needed without decoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    topic: Topic,
    event_type: EventType,
    correlation_id: CorrelationId,
    body: Value,
}

impl BusMessage {
    /// Serialises an envelope for its event type's topic.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Malformed`] when the payload cannot be
    /// serialised.
    pub fn from_envelope<P: Serialize>(envelope: &EventEnvelope<P>) -> Result<Self, EnvelopeError> {
        Ok(Self {
            topic: envelope.event_type().topic(),
            event_type: envelope.event_type(),
            correlation_id: envelope.correlation_id(),
            body: serde_json::to_value(envelope)?,
        })
    }

    /// Interprets a pushed subscription body.
    ///
    /// Sidecars deliver CloudEvents whose `data` member holds the envelope;
    /// bare envelopes are accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] when no envelope with a known event type
    /// can be found.
    pub fn from_push_body(topic: Topic, body: Value) -> Result<Self, EnvelopeError> {
        let envelope = match body {
            Value::Object(mut object) if object.contains_key("specversion") => {
                object.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        let event_type = envelope
            .get("event_type")
            .and_then(Value::as_str)
            .and_then(|value| EventType::try_from(value).ok())
            .ok_or(EnvelopeError::MissingEventType)?;
        let correlation_id = envelope
            .get("correlation_id")
            .cloned()
            .map(serde_json::from_value::<CorrelationId>)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            topic,
            event_type,
            correlation_id,
            body: envelope,
        })
    }

    /// Re-targets the message at another topic.
    #[must_use]
    pub const fn on_topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }

    /// Returns the topic.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Returns the correlation identifier.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Returns the JSON body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Decodes the body into a typed envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Malformed`] when the body does not match `P`.
    pub fn decode<P: DeserializeOwned>(&self) -> Result<EventEnvelope<P>, EnvelopeError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}
