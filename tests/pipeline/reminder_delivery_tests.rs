//! Reminder scheduling, firing, delivery, and retry across services.

use super::helpers::{Pipeline, due, eventually, trigger_for};
use chrono::Duration;
use std::sync::Arc;
use taskflow::events::{EventType, Topic, UserId};
use taskflow::notification::{
    adapters::MpscDeliveryChannel,
    domain::{ReminderKind, ReminderNotification},
};
use taskflow::reminder::{
    domain::{Reminder, ReminderStatus},
    services::{CancelOutcome, CreateReminderRequest, IgnoreReason, TriggerOutcome},
};
use taskflow::task::services::CreateTaskRequest;

async fn reminder_before_due(pipeline: &Pipeline, title: &str, minutes: u32) -> Reminder {
    let task = pipeline
        .backend
        .tasks()
        .create_task(CreateTaskRequest::new(title).with_due_date(due()))
        .await
        .expect("task creation should succeed");
    pipeline
        .backend
        .reminders()
        .create_reminder(CreateReminderRequest::new(task.id()).with_offset_minutes(minutes))
        .await
        .expect("reminder creation should succeed")
        .reminder
}

#[tokio::test(flavor = "multi_thread")]
async fn connected_user_receives_reminder_and_it_is_marked_sent() {
    let pipeline = Pipeline::start();
    let (channel, mut frames) = MpscDeliveryChannel::open();
    pipeline
        .notifications
        .registry()
        .connect(&UserId::new("1"), Arc::new(channel));

    let reminder = reminder_before_due(&pipeline, "Pay rent", 30).await;
    let job_id = reminder.job_id().cloned().expect("reminder should be scheduled");
    pipeline.clock.set(due() - Duration::minutes(30));

    let outcome = pipeline.fire(&job_id).await;
    assert_eq!(outcome.status(), "processed");

    let frame = tokio::time::timeout(std::time::Duration::from_secs(2), frames.recv())
        .await
        .expect("frame should arrive in time")
        .expect("channel should stay open");
    let notification: ReminderNotification =
        serde_json::from_str(&frame).expect("frame should be a reminder notification");
    assert_eq!(notification.task_id, reminder.task_id());
    assert_eq!(notification.task_title, "Pay rent");
    assert_eq!(notification.reminder_type, ReminderKind::DueSoon);

    let (harness, target) = (&pipeline, &reminder);
    let sent = eventually(|| async move {
        harness.reminder(target).await.status() == ReminderStatus::Sent
    })
    .await;
    assert!(sent, "reminder should be marked sent");
    assert_eq!(pipeline.notifications.consumer().stats().snapshot().notifications_sent, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn absent_user_causes_a_delivery_retry() {
    let pipeline = Pipeline::start();
    let reminder = reminder_before_due(&pipeline, "Renew passport", 60).await;
    let job_id = reminder.job_id().cloned().expect("reminder should be scheduled");

    pipeline.fire(&job_id).await;

    let (harness, target) = (&pipeline, &reminder);
    let retried =
        eventually(|| async move { harness.reminder(target).await.retry_count() == 1 }).await;
    assert!(retried, "reminder should be rescheduled once");

    let current = pipeline.reminder(&reminder).await;
    assert_eq!(current.status(), ReminderStatus::Pending);
    assert_eq!(current.last_error(), Some("user not connected"));
    let replacement = current.job_id().expect("retry should register a new job");
    assert!(pipeline.jobs.jobs().iter().any(|job| &job.job_id == replacement));
    assert!(
        pipeline
            .bus
            .published_on(Topic::Reminders)
            .iter()
            .any(|message| message.event_type() == EventType::ReminderFailed)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_reminder_is_ignored_when_its_job_fires() {
    let pipeline = Pipeline::start();
    let reminder = reminder_before_due(&pipeline, "Book flights", 1440).await;
    let job_id = reminder.job_id().cloned().expect("reminder should be scheduled");

    let cancelled = pipeline
        .backend
        .reminders()
        .cancel_reminder(reminder.id())
        .await
        .expect("cancellation should succeed");
    assert!(matches!(cancelled, CancelOutcome::Cancelled { job_deleted: true, .. }));
    assert_eq!(pipeline.jobs.deleted(), vec![job_id]);

    let late = pipeline
        .backend
        .triggers()
        .handle(&trigger_for(&reminder))
        .await
        .expect("trigger handling should succeed");
    assert_eq!(
        late,
        TriggerOutcome::Ignored(IgnoreReason::AlreadyProcessed(ReminderStatus::Cancelled))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_purges_its_reminders_and_jobs() {
    let pipeline = Pipeline::start();
    let reminder = reminder_before_due(&pipeline, "Water plants", 15).await;
    let job_id = reminder.job_id().cloned().expect("reminder should be scheduled");

    pipeline
        .backend
        .delete_task(reminder.task_id())
        .await
        .expect("task deletion should succeed");

    let remaining = pipeline
        .backend
        .reminders()
        .reminders_for_task(reminder.task_id())
        .await
        .expect("reminder lookup should succeed");
    assert!(remaining.is_empty());
    assert!(pipeline.jobs.deleted().contains(&job_id));
    assert!(pipeline.jobs.jobs().is_empty());
}
