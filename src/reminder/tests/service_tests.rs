//! Reminder scheduling service tests.

use std::sync::Arc;

use super::support::{Harness, at, due};
use crate::clock::FixedClock;
use crate::events::{EventType, ReminderEventPayload, Topic};
use crate::failure::FailureKind;
use crate::reminder::{
    adapters::memory::{InMemoryJobScheduler, InMemoryReminderRepository},
    domain::{ReminderDomainError, ReminderId, ReminderOffset, ReminderPolicy, ReminderStatus},
    ports::{JobSchedulerError, MockJobScheduler},
    services::{
        CancelOutcome, CreateReminderRequest, ReminderSchedulingError, ReminderSchedulingService,
    },
};
use crate::task::{adapters::memory::InMemoryTaskRepository, domain::TaskId};
use rstest::{fixture, rstest};

type TestService = ReminderSchedulingService<
    InMemoryTaskRepository,
    InMemoryReminderRepository,
    InMemoryJobScheduler,
    FixedClock,
>;

fn service_for(harness: &Harness) -> TestService {
    ReminderSchedulingService::new(
        harness.tasks.clone(),
        harness.reminders.clone(),
        harness.jobs.clone(),
        harness.events.clone(),
        harness.clock.clone(),
        ReminderPolicy::default(),
    )
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn offset_reminder_is_stored_scheduled_and_announced(harness: Harness) {
    let service = service_for(&harness);
    let task = harness.task("Pay rent", Some(due())).await;

    let creation = service
        .create_reminder(CreateReminderRequest::new(task.id()).with_offset_string("1 day"))
        .await
        .expect("reminder creation should succeed");

    let reminder = &creation.reminder;
    assert_eq!(reminder.scheduled_at(), at(2025, 6, 9, 9));
    assert_eq!(reminder.offset(), Some(&ReminderOffset::before_due(1_440)));
    assert_eq!(reminder.status(), ReminderStatus::Pending);
    assert_eq!(creation.scheduling_error, None);
    assert!(creation.event_published);

    let jobs = harness.jobs.jobs();
    assert_eq!(jobs.len(), 1);
    let job = jobs.first().expect("one job");
    assert_eq!(creation.job_id(), Some(&job.job_id));
    assert_eq!(job.due_time, at(2025, 6, 9, 9));
    assert_eq!(job.data.task_title, "Pay rent");
    assert_eq!(job.data.offset_minutes, Some(1_440));

    let events = harness.bus.published_on(Topic::Reminders);
    assert_eq!(events.len(), 1);
    let event = events.first().expect("one event");
    assert_eq!(event.event_type(), EventType::ReminderScheduled);
    let payload = event
        .decode::<ReminderEventPayload>()
        .expect("payload should decode")
        .into_payload();
    assert_eq!(payload.reminder_offset.as_deref(), Some("1 day before"));
    assert_eq!(payload.task_title.as_deref(), Some("Pay rent"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_without_due_date_cannot_have_reminders(harness: Harness) {
    let service = service_for(&harness);
    let task = harness.task("Someday", None).await;

    let result = service
        .create_reminder(CreateReminderRequest::new(task.id()).with_offset_minutes(30))
        .await;

    assert!(matches!(
        result,
        Err(ReminderSchedulingError::MissingDueDate(id)) if id == task.id()
    ));
    assert!(harness.jobs.jobs().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_is_reported(harness: Harness) {
    let service = service_for(&harness);

    let result = service
        .create_reminder(CreateReminderRequest::new(TaskId::new(404)).with_offset_minutes(30))
        .await;

    assert!(matches!(
        result,
        Err(ReminderSchedulingError::TaskNotFound(id)) if id == TaskId::new(404)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conflicting_schedule_inputs_are_rejected(harness: Harness) {
    let service = service_for(&harness);
    let task = harness.task("Pay rent", Some(due())).await;

    let result = service
        .create_reminder(
            CreateReminderRequest::new(task.id())
                .with_offset_minutes(30)
                .with_offset_string("1 hour"),
        )
        .await;

    assert!(matches!(
        result,
        Err(ReminderSchedulingError::Domain(
            ReminderDomainError::AmbiguousSchedule
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scheduler_outage_leaves_failed_reminder(harness: Harness) {
    let service = service_for(&harness);
    let task = harness.task("Pay rent", Some(due())).await;
    harness.jobs.fail_with("connection refused");

    let creation = service
        .create_reminder(CreateReminderRequest::new(task.id()).with_offset_minutes(60))
        .await
        .expect("creation reports scheduler failures without erroring");

    assert_eq!(creation.reminder.status(), ReminderStatus::Failed);
    assert_eq!(creation.job_id(), None);
    assert!(
        creation
            .scheduling_error
            .as_deref()
            .is_some_and(|error| error.contains("connection refused"))
    );

    let stored = service
        .find_reminder(creation.reminder.id())
        .await
        .expect("lookup should succeed")
        .expect("reminder should persist");
    assert_eq!(stored.status(), ReminderStatus::Failed);

    let events = harness.bus.published_on(Topic::Reminders);
    assert_eq!(
        events.first().map(|event| event.event_type()),
        Some(EventType::ReminderFailed)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scheduler_rejection_is_classified(harness: Harness) {
    let mut jobs = MockJobScheduler::new();
    jobs.expect_schedule().times(1).returning(|job| {
        Err(JobSchedulerError::Rejected {
            job_id: job.job_id.clone(),
            status: 503,
            body: "sidecar starting".to_owned(),
        })
    });
    let service = ReminderSchedulingService::new(
        harness.tasks.clone(),
        harness.reminders.clone(),
        Arc::new(jobs),
        harness.events.clone(),
        harness.clock.clone(),
        ReminderPolicy::default(),
    );
    let task = harness.task("Pay rent", Some(due())).await;

    let creation = service
        .create_reminder(CreateReminderRequest::new(task.id()).with_scheduled_at(at(2025, 6, 10, 8)))
        .await
        .expect("creation reports scheduler failures without erroring");

    assert_eq!(creation.reminder.status(), ReminderStatus::Failed);
    assert!(
        creation
            .scheduling_error
            .as_deref()
            .is_some_and(|error| error.contains("503"))
    );
    assert_eq!(
        JobSchedulerError::Rejected {
            job_id: crate::reminder::domain::JobId::from_raw("x"),
            status: 503,
            body: String::new(),
        }
        .kind(),
        FailureKind::Transient
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_deletes_job_and_is_final(harness: Harness) {
    let service = service_for(&harness);
    let task = harness.task("Pay rent", Some(due())).await;
    let creation = service
        .create_reminder(CreateReminderRequest::new(task.id()).with_offset_minutes(30))
        .await
        .expect("reminder creation should succeed");
    let job_id = creation.job_id().cloned().expect("reminder should be scheduled");

    let outcome = service
        .cancel_reminder(creation.reminder.id())
        .await
        .expect("cancel should succeed");

    let CancelOutcome::Cancelled {
        reminder,
        job_deleted,
        event_published,
    } = outcome
    else {
        panic!("pending reminder should be cancelled");
    };
    assert_eq!(reminder.status(), ReminderStatus::Cancelled);
    assert!(job_deleted);
    assert!(event_published);
    assert_eq!(harness.jobs.deleted(), vec![job_id]);
    assert!(harness.jobs.jobs().is_empty());

    let again = service
        .cancel_reminder(reminder.id())
        .await
        .expect("second cancel should succeed");
    assert!(matches!(again, CancelOutcome::AlreadyTerminal(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_survives_scheduler_outage(harness: Harness) {
    let service = service_for(&harness);
    let task = harness.task("Pay rent", Some(due())).await;
    let creation = service
        .create_reminder(CreateReminderRequest::new(task.id()).with_offset_minutes(30))
        .await
        .expect("reminder creation should succeed");
    harness.jobs.fail_with("timeout");

    let outcome = service
        .cancel_reminder(creation.reminder.id())
        .await
        .expect("cancel should succeed");

    assert!(matches!(
        outcome,
        CancelOutcome::Cancelled {
            job_deleted: false,
            ..
        }
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_unknown_reminder_is_an_error(harness: Harness) {
    let service = service_for(&harness);
    let result = service.cancel_reminder(ReminderId::new(99)).await;
    assert!(matches!(
        result,
        Err(ReminderSchedulingError::ReminderNotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reminders_list_in_fire_order_and_purge_with_task(harness: Harness) {
    let service = service_for(&harness);
    let task = harness.task("Pay rent", Some(due())).await;
    for offset in ["1 hour", "1 day", "30 minutes"] {
        service
            .create_reminder(CreateReminderRequest::new(task.id()).with_offset_string(offset))
            .await
            .expect("reminder creation should succeed");
    }

    let listed = service
        .reminders_for_task(task.id())
        .await
        .expect("listing should succeed");
    let minutes: Vec<u32> = listed
        .iter()
        .filter_map(|reminder| reminder.offset().map(ReminderOffset::minutes))
        .collect();
    assert_eq!(minutes, vec![1_440, 60, 30]);

    let status = service
        .job_status(listed.first().expect("reminder").id())
        .await
        .expect("status lookup should succeed");
    assert!(status.is_some());

    let purged = service
        .purge_task_reminders(task.id())
        .await
        .expect("purge should succeed");
    assert_eq!(purged, 3);
    assert_eq!(harness.jobs.deleted().len(), 3);
    assert!(
        service
            .reminders_for_task(task.id())
            .await
            .expect("listing should succeed")
            .is_empty()
    );
}
