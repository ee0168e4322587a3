//! Consumer turning `reminder.triggered` events into user notifications.

use super::{ConnectionRegistry, DeliveryStats};
use crate::events::{
    BusMessage, EventHandler, EventPublisher, EventType, HandlerOutcome, ReminderEventPayload,
};
use crate::notification::domain::ReminderNotification;
use async_trait::async_trait;
use std::sync::Arc;

/// Reason reported when nobody is listening for a reminder.
pub const NOT_CONNECTED: &str = "user not connected";

/// Delivers triggered reminders to the owning user's live connections.
///
/// Every delivery attempt is followed by `reminder.sent` or
/// `reminder.failed` so the backend can record the outcome or retry.
pub struct ReminderDeliveryConsumer {
    registry: Arc<ConnectionRegistry>,
    events: EventPublisher,
    stats: Arc<DeliveryStats>,
}

impl ReminderDeliveryConsumer {
    /// Creates a consumer delivering through `registry`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, events: EventPublisher) -> Self {
        Self {
            registry,
            events,
            stats: Arc::new(DeliveryStats::default()),
        }
    }

    /// Returns the consumer's counters.
    #[must_use]
    pub fn stats(&self) -> Arc<DeliveryStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl EventHandler for ReminderDeliveryConsumer {
    async fn handle(&self, message: &BusMessage) -> HandlerOutcome {
        if message.event_type() != EventType::ReminderTriggered {
            return HandlerOutcome::Handled;
        }
        let envelope = match message.decode::<ReminderEventPayload>() {
            Ok(envelope) => envelope,
            Err(err) => {
                self.stats.record_error();
                tracing::warn!(error = %err, "undecodable reminder event");
                return HandlerOutcome::Drop(err.to_string());
            }
        };
        self.stats.record_received();

        let user_id = envelope.user_id().clone();
        let payload = envelope.into_payload();
        let frame = match serde_json::to_string(&ReminderNotification::from_payload(&payload)) {
            Ok(frame) => frame,
            Err(err) => {
                self.stats.record_error();
                return HandlerOutcome::Drop(err.to_string());
            }
        };

        let delivered = self.registry.send_to_user(&user_id, &frame);
        let (event_type, report) = if delivered > 0 {
            self.stats.record_sent(u64::try_from(delivered).unwrap_or(u64::MAX));
            tracing::info!(
                reminder_id = %payload.reminder_id,
                user_id = %user_id,
                deliveries = delivered,
                "reminder delivered"
            );
            (EventType::ReminderSent, payload.with_status("sent"))
        } else {
            tracing::info!(
                reminder_id = %payload.reminder_id,
                user_id = %user_id,
                "user not connected; reminder deferred"
            );
            (
                EventType::ReminderFailed,
                payload.with_status("failed").with_error(NOT_CONNECTED),
            )
        };
        if !self
            .events
            .publish_reminder_event(event_type, report, message.correlation_id())
            .await
        {
            self.stats.record_error();
        }
        HandlerOutcome::Handled
    }
}
