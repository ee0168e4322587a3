//! Completion of recurring tasks with the worker subscribed.

use super::helpers::{Pipeline, due, eventually};
use chrono::Duration;
use std::sync::Arc;
use taskflow::app::{RecurringWorker, TaskService};
use taskflow::clock::FixedClock;
use taskflow::events::{CorrelationId, EventPublisher, EventType, UserId};
use taskflow::recurring::adapters::LifecycleTaskApi;
use taskflow::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository},
    domain::Task,
    services::{CompletionOutcome, CreateTaskRequest},
};
use tokio::task::JoinHandle;

type LocalApi = LifecycleTaskApi<InMemoryTaskRepository, InMemoryAuditLog, FixedClock>;

fn start_worker(pipeline: &Pipeline) -> (RecurringWorker<LocalApi, FixedClock>, JoinHandle<()>) {
    let lifecycle: Arc<TaskService<FixedClock>> = Arc::new(pipeline.backend.tasks().clone());
    let worker = RecurringWorker::new(
        Arc::new(LifecycleTaskApi::new(lifecycle)),
        pipeline.clock.clone(),
    );
    let handle = worker.subscribe(&pipeline.bus);
    (worker, handle)
}

async fn daily_task(pipeline: &Pipeline, title: &str) -> Task {
    pipeline
        .backend
        .tasks()
        .create_task(
            CreateTaskRequest::new(title)
                .with_due_date(due())
                .with_recurrence("daily"),
        )
        .await
        .expect("task creation should succeed")
}

async fn chain_len(pipeline: &Pipeline, task: &Task) -> usize {
    pipeline
        .backend
        .tasks()
        .recurring_chain(task.id())
        .await
        .expect("chain lookup should succeed")
        .len()
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_creates_a_single_occurrence_with_the_worker_running() {
    let pipeline = Pipeline::start();
    let (worker, handle) = start_worker(&pipeline);
    let task = daily_task(&pipeline, "Water plants").await;

    let outcome = pipeline
        .backend
        .tasks()
        .complete_task(task.id())
        .await
        .expect("completion should succeed");
    let CompletionOutcome::Completed(completion) = outcome else {
        panic!("expected a fresh completion");
    };
    let next = completion
        .next_occurrence
        .expect("recurring task should get a next occurrence");
    assert_eq!(next.due_date, Some(due() + Duration::days(1)));

    let consumer = worker.consumer();
    let watched = &consumer;
    let examined =
        eventually(|| async move { watched.stats().snapshot().events_processed == 1 }).await;
    assert!(examined, "worker should examine the completion");

    let stats = consumer.stats().snapshot();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.tasks_created, 0);
    assert_eq!(chain_len(&pipeline, &task).await, 2);

    worker.shutdown_token().cancel();
    handle.await.expect("subscription should stop cleanly");
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_fills_in_an_occurrence_the_backend_did_not_create() {
    let pipeline = Pipeline::start();
    let (worker, handle) = start_worker(&pipeline);
    let task = daily_task(&pipeline, "Stand-up notes").await;
    let publisher = EventPublisher::new(
        pipeline.bus.clone(),
        pipeline.clock.clone(),
        UserId::new("1"),
    );

    for _ in 0..2 {
        let published = publisher
            .publish_task_event(
                EventType::TaskCompleted,
                task.id(),
                task.snapshot(),
                CorrelationId::new(),
            )
            .await;
        assert!(published);
    }

    let consumer = worker.consumer();
    let watched = &consumer;
    let examined =
        eventually(|| async move { watched.stats().snapshot().events_processed == 2 }).await;
    assert!(examined, "worker should examine both deliveries");
    assert_eq!(consumer.stats().snapshot().errors_count, 0);

    let chain = pipeline
        .backend
        .tasks()
        .recurring_chain(task.id())
        .await
        .expect("chain lookup should succeed");
    assert_eq!(chain.len(), 2, "redelivery must not duplicate the occurrence");
    let child = chain.last().expect("chain should hold the new occurrence");
    assert_eq!(child.parent_task_id(), Some(task.id()));
    assert_eq!(child.due_date(), Some(due() + Duration::days(1)));

    worker.shutdown_token().cancel();
    handle.await.expect("subscription should stop cleanly");
}
