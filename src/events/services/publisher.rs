//! Typed event publishing on top of a [`MessageBus`].

use crate::events::{
    domain::{
        BusMessage, CorrelationId, EventEnvelope, EventType, ReminderEventPayload,
        TaskEventPayload, Topic, UserId,
    },
    ports::MessageBus,
};
use crate::task::domain::TaskId;
use mockable::Clock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Wraps payloads in envelopes and publishes them.
///
/// Publishing never fails the caller: the helpers report success as a `bool`
/// and log failures, so the state change that produced the event stands on
/// its own.
#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn MessageBus>,
    clock: Arc<dyn Clock + Send + Sync>,
    user_id: UserId,
}

impl EventPublisher {
    /// Creates a publisher stamping events for `user_id`.
    #[must_use]
    pub fn new(
        bus: Arc<dyn MessageBus>,
        clock: Arc<dyn Clock + Send + Sync>,
        user_id: UserId,
    ) -> Self {
        Self {
            bus,
            clock,
            user_id,
        }
    }

    /// Returns the user events are attributed to.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Wraps a payload in an envelope stamped with the current time.
    #[must_use]
    pub fn envelope<P>(
        &self,
        event_type: EventType,
        payload: P,
        correlation_id: CorrelationId,
    ) -> EventEnvelope<P> {
        EventEnvelope::new(
            event_type,
            payload,
            self.user_id.clone(),
            self.clock.utc(),
            correlation_id,
        )
    }

    /// Publishes a task event on `task-events` and mirrors it on
    /// `task-updates`.
    ///
    /// Returns whether the `task-events` publish succeeded.
    pub async fn publish_task_event(
        &self,
        event_type: EventType,
        task_id: TaskId,
        task_data: Value,
        correlation_id: CorrelationId,
    ) -> bool {
        let envelope = self.envelope(event_type, TaskEventPayload { task_id, task_data }, correlation_id);
        let Some(message) = Self::encode(&envelope) else {
            return false;
        };
        let published = self.send(&message).await;
        self.send(&message.on_topic(Topic::TaskUpdates)).await;
        published
    }

    /// Publishes a reminder event on `reminders`.
    pub async fn publish_reminder_event(
        &self,
        event_type: EventType,
        payload: ReminderEventPayload,
        correlation_id: CorrelationId,
    ) -> bool {
        let envelope = self.envelope(event_type, payload, correlation_id);
        match Self::encode(&envelope) {
            Some(message) => self.send(&message).await,
            None => false,
        }
    }

    fn encode<P: Serialize>(envelope: &EventEnvelope<P>) -> Option<BusMessage> {
        match BusMessage::from_envelope(envelope) {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::error!(
                    event_type = %envelope.event_type(),
                    error = %err,
                    "failed to encode event envelope"
                );
                None
            }
        }
    }

    async fn send(&self, message: &BusMessage) -> bool {
        match self.bus.publish(message).await {
            Ok(()) => {
                tracing::debug!(
                    topic = %message.topic(),
                    event_type = %message.event_type(),
                    correlation_id = %message.correlation_id(),
                    "event published"
                );
                true
            }
            Err(err) => {
                tracing::warn!(
                    topic = %message.topic(),
                    event_type = %message.event_type(),
                    correlation_id = %message.correlation_id(),
                    failure = ?err.kind(),
                    error = %err,
                    "event publish failed"
                );
                false
            }
        }
    }
}
