//! Reminder delivery consumer tests.

use std::sync::Arc;

use crate::clock::FixedClock;
use crate::events::{
    BusMessage, CorrelationId, EventHandler, EventPublisher, EventType, HandlerOutcome,
    ReminderEventPayload, Topic, UserId, adapters::InMemoryMessageBus,
};
use crate::notification::{
    adapters::MpscDeliveryChannel,
    domain::{ReminderKind, ReminderNotification},
    services::{ConnectionRegistry, DeliveryStatsSnapshot, NOT_CONNECTED, ReminderDeliveryConsumer},
};
use crate::reminder::domain::ReminderId;
use crate::task::domain::TaskId;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::json;

fn due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

struct Setup {
    bus: Arc<InMemoryMessageBus>,
    registry: Arc<ConnectionRegistry>,
    publisher: EventPublisher,
    consumer: ReminderDeliveryConsumer,
}

#[fixture]
fn setup() -> Setup {
    let bus = Arc::new(InMemoryMessageBus::new());
    let clock = Arc::new(FixedClock::new(due() - Duration::hours(1)));
    let publisher = EventPublisher::new(bus.clone(), clock, UserId::new("7"));
    let registry = Arc::new(ConnectionRegistry::new());
    let consumer = ReminderDeliveryConsumer::new(registry.clone(), publisher.clone());
    Setup {
        bus,
        registry,
        publisher,
        consumer,
    }
}

fn payload(scheduled_at: DateTime<Utc>) -> ReminderEventPayload {
    ReminderEventPayload {
        reminder_id: ReminderId::new(3),
        task_id: TaskId::new(11),
        scheduled_at,
        task_title: Some("Submit report".to_owned()),
        due_date: Some(due()),
        reminder_offset: Some("1 hour before".to_owned()),
        dapr_job_id: Some("reminder-11-3-abc".to_owned()),
        status: "triggered".to_owned(),
        retry_count: 0,
        error: None,
    }
}

fn triggered(setup: &Setup, correlation_id: CorrelationId) -> BusMessage {
    let envelope = setup.publisher.envelope(
        EventType::ReminderTriggered,
        payload(due() - Duration::hours(1)),
        correlation_id,
    );
    BusMessage::from_envelope(&envelope).expect("envelope should encode")
}

fn reports(setup: &Setup) -> Vec<BusMessage> {
    setup
        .bus
        .published_on(Topic::Reminders)
        .into_iter()
        .filter(|message| message.event_type() != EventType::ReminderTriggered)
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connected_user_receives_frame_and_sent_is_reported(setup: Setup) {
    let (channel, mut frames) = MpscDeliveryChannel::open();
    setup.registry.connect(&UserId::new("7"), Arc::new(channel));
    let correlation_id = CorrelationId::new();

    let outcome = setup.consumer.handle(&triggered(&setup, correlation_id)).await;

    assert_eq!(outcome, HandlerOutcome::Handled);
    let frame = frames.try_recv().expect("frame should be queued");
    let notification: ReminderNotification =
        serde_json::from_str(&frame).expect("frame should be a notification");
    assert_eq!(notification.kind, "reminder");
    assert_eq!(notification.task_id, TaskId::new(11));
    assert_eq!(notification.reminder_type, ReminderKind::DueSoon);
    assert_eq!(notification.message, "Reminder: \"Submit report\" (1 hour before)");

    let reports = reports(&setup);
    assert_eq!(reports.len(), 1);
    let report = reports.first().expect("one report");
    assert_eq!(report.event_type(), EventType::ReminderSent);
    assert_eq!(report.correlation_id(), correlation_id);
    assert_eq!(
        setup.consumer.stats().snapshot(),
        DeliveryStatsSnapshot {
            events_received: 1,
            notifications_sent: 1,
            errors_count: 0,
        }
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn absent_user_is_reported_as_failed_delivery(setup: Setup) {
    let outcome = setup.consumer.handle(&triggered(&setup, CorrelationId::new())).await;

    assert_eq!(outcome, HandlerOutcome::Handled);
    let reports = reports(&setup);
    let report = reports.first().expect("one report");
    assert_eq!(report.event_type(), EventType::ReminderFailed);
    let failure = report
        .decode::<ReminderEventPayload>()
        .expect("report should decode")
        .into_payload();
    assert_eq!(failure.error.as_deref(), Some(NOT_CONNECTED));
    assert_eq!(failure.reminder_id, ReminderId::new(3));
    assert_eq!(setup.consumer.stats().snapshot().notifications_sent, 0);
    assert_eq!(setup.consumer.stats().snapshot().events_received, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_reminder_events_are_skipped(setup: Setup) {
    let envelope = setup.publisher.envelope(
        EventType::ReminderScheduled,
        payload(due() - Duration::hours(1)),
        CorrelationId::new(),
    );
    let message = BusMessage::from_envelope(&envelope).expect("envelope should encode");

    assert_eq!(setup.consumer.handle(&message).await, HandlerOutcome::Handled);
    assert!(reports(&setup).is_empty());
    assert_eq!(setup.consumer.stats().snapshot(), DeliveryStatsSnapshot::default());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_trigger_is_dropped(setup: Setup) {
    let message = BusMessage::from_push_body(
        Topic::Reminders,
        json!({"event_type": "reminder.triggered", "task_id": 11}),
    )
    .expect("routing fields are present");

    assert!(matches!(
        setup.consumer.handle(&message).await,
        HandlerOutcome::Drop(_)
    ));
    assert_eq!(setup.consumer.stats().snapshot().errors_count, 1);
}

#[rstest]
fn late_reminders_are_marked_overdue() {
    let notification = ReminderNotification::from_payload(&payload(due() + Duration::minutes(15)));

    assert_eq!(notification.reminder_type, ReminderKind::Overdue);
    assert_eq!(notification.message, "\"Submit report\" is overdue");
}
