//! Completion and next-occurrence tests.

use std::sync::Arc;

use super::service_tests::{Harness, at, harness};
use crate::events::{EventPublisher, EventType, TaskEventPayload, Topic, UserId};
use crate::task::{
    adapters::memory::InMemoryAuditLog,
    domain::{AuditEventKind, NewTask, Task, TaskId, TaskStatus, TaskTitle},
    ports::{MockTaskRepository, TaskRepositoryError},
    services::{CompletionOutcome, CreateTaskRequest, TaskCompletion, TaskLifecycleService},
};
use rstest::rstest;

async fn complete(harness: &Harness, id: TaskId) -> TaskCompletion {
    match harness
        .service
        .complete_task(id)
        .await
        .expect("completion should succeed")
    {
        CompletionOutcome::Completed(completion) => completion,
        CompletionOutcome::AlreadyCompleted(task) => {
            panic!("task {} was already completed", task.id())
        }
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn monthly_task_on_the_31st_clamps_to_february(harness: Harness) {
    let task = harness
        .service
        .create_task(
            CreateTaskRequest::new("Pay rent")
                .with_due_date(at(2025, 1, 31, 9))
                .with_recurrence("monthly:31"),
        )
        .await
        .expect("task creation should succeed");
    harness.clock.set(at(2025, 1, 31, 18));

    let completion = complete(&harness, task.id()).await;

    assert!(completion.is_recurring);
    assert_eq!(completion.task.status(), TaskStatus::Completed);
    assert_eq!(completion.task.completed_at(), Some(at(2025, 1, 31, 18)));
    assert_eq!(completion.next_occurrence_error, None);
    assert!(completion.event_published);
    let next = completion.next_occurrence.expect("next occurrence should exist");
    assert_eq!(next.due_date, Some(at(2025, 2, 28, 9)));
    assert_eq!(next.parent_task_id, Some(task.id()));
    assert_eq!(next.title, "Pay rent");

    let stored = harness
        .service
        .find_task(next.id)
        .await
        .expect("lookup should succeed")
        .expect("next occurrence should be stored");
    assert_eq!(stored.status(), TaskStatus::Pending);
    assert_eq!(stored.recurrence(), task.recurrence());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_event_carries_next_occurrence_id(harness: Harness) {
    let task = harness
        .service
        .create_task(
            CreateTaskRequest::new("Standup")
                .with_due_date(at(2025, 1, 2, 9))
                .with_recurrence("daily"),
        )
        .await
        .expect("task creation should succeed");

    let completion = complete(&harness, task.id()).await;
    let next_id = completion.next_occurrence.expect("next occurrence").id;

    let events = harness.bus.published_on(Topic::TaskEvents);
    let types: Vec<EventType> = events.iter().map(|message| message.event_type()).collect();
    assert_eq!(
        types,
        vec![
            EventType::TaskCreated,
            EventType::TaskCreated,
            EventType::TaskCompleted
        ]
    );

    let completed = events.last().expect("completed event");
    let child_created = events.get(1).expect("child created event");
    assert_eq!(completed.correlation_id(), child_created.correlation_id());
    let payload = completed
        .decode::<TaskEventPayload>()
        .expect("payload should decode")
        .into_payload();
    assert_eq!(payload.task_id, task.id());
    assert_eq!(payload.task_data["is_recurring"], true);
    assert_eq!(payload.task_data["next_occurrence_id"], next_id.value());
    assert_eq!(payload.task_data["status"], "completed");

    let history = harness
        .service
        .audit_history(task.id())
        .await
        .expect("audit should be readable");
    let entry = history.last().expect("completion entry");
    assert_eq!(entry.event_type(), AuditEventKind::TaskCompleted);
    assert_eq!(entry.event_data()["old_status"], "pending");
    assert_eq!(entry.event_data()["new_status"], "completed");
    assert_eq!(entry.event_data()["next_occurrence_id"], next_id.value());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_off_task_completes_without_successor(harness: Harness) {
    let task = harness
        .service
        .create_task(CreateTaskRequest::new("Buy milk").with_due_date(at(2025, 1, 2, 9)))
        .await
        .expect("task creation should succeed");

    let completion = complete(&harness, task.id()).await;

    assert!(!completion.is_recurring);
    assert_eq!(completion.next_occurrence, None);
    let chain = harness
        .service
        .recurring_chain(task.id())
        .await
        .expect("chain lookup should succeed");
    assert_eq!(chain.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_twice_keeps_a_single_successor(harness: Harness) {
    let task = harness
        .service
        .create_task(
            CreateTaskRequest::new("Stretch")
                .with_due_date(at(2025, 1, 2, 7))
                .with_recurrence("daily"),
        )
        .await
        .expect("task creation should succeed");
    complete(&harness, task.id()).await;

    let again = harness
        .service
        .complete_task(task.id())
        .await
        .expect("second completion should succeed");

    assert!(matches!(again, CompletionOutcome::AlreadyCompleted(_)));
    let chain = harness
        .service
        .recurring_chain(task.id())
        .await
        .expect("chain lookup should succeed");
    assert_eq!(chain.len(), 2);
    let completions = harness
        .service
        .audit_history(task.id())
        .await
        .expect("audit lookup should succeed")
        .iter()
        .filter(|entry| entry.event_type() == AuditEventKind::TaskCompleted)
        .count();
    assert_eq!(completions, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn chain_is_found_from_any_member(harness: Harness) {
    let root = harness
        .service
        .create_task(
            CreateTaskRequest::new("Water plants")
                .with_due_date(at(2025, 1, 4, 9))
                .with_recurrence("every saturday"),
        )
        .await
        .expect("task creation should succeed");
    let second = complete(&harness, root.id())
        .await
        .next_occurrence
        .expect("second occurrence");
    let third = complete(&harness, second.id)
        .await
        .next_occurrence
        .expect("third occurrence");
    assert_eq!(third.due_date, Some(at(2025, 1, 18, 9)));

    let chain = harness
        .service
        .recurring_chain(second.id)
        .await
        .expect("chain lookup should succeed");
    let ids: Vec<TaskId> = chain.iter().map(Task::id).collect();
    assert_eq!(ids, vec![root.id(), second.id, third.id]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successor_failure_does_not_undo_completion(harness: Harness) {
    let clock = harness.clock.clone();
    let stored = NewTask::new(TaskTitle::new("Standup").expect("valid title"), &*clock)
        .with_due_date(Some(at(2025, 1, 2, 9)))
        .with_recurrence("daily".parse().expect("valid pattern"))
        .into_task(TaskId::new(5));

    let mut tasks = MockTaskRepository::new();
    tasks
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    tasks.expect_update().times(1).returning(|_| Ok(()));
    tasks.expect_find_children().returning(|_| Ok(Vec::new()));
    tasks.expect_insert().times(1).returning(|_| {
        Err(TaskRepositoryError::persistence(std::io::Error::other(
            "connection reset",
        )))
    });
    let service = TaskLifecycleService::new(
        Arc::new(tasks),
        Arc::new(InMemoryAuditLog::new()),
        EventPublisher::new(harness.bus.clone(), clock.clone(), UserId::new("1")),
        clock,
    );

    let outcome = service
        .complete_task(TaskId::new(5))
        .await
        .expect("completion should succeed");

    let CompletionOutcome::Completed(completion) = outcome else {
        panic!("task should complete");
    };
    assert_eq!(completion.task.status(), TaskStatus::Completed);
    assert_eq!(completion.next_occurrence, None);
    assert!(
        completion
            .next_occurrence_error
            .as_deref()
            .is_some_and(|error| error.contains("connection reset"))
    );

    let kinds: Vec<AuditEventKind> = service
        .audit_history(TaskId::new(5))
        .await
        .expect("audit should be readable")
        .iter()
        .map(|entry| entry.event_type())
        .collect();
    assert_eq!(
        kinds,
        vec![
            AuditEventKind::TaskCompleted,
            AuditEventKind::NextOccurrenceFailed
        ]
    );
}
