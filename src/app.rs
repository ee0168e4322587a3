//! Composition roots for the three deployable services.
//!
//! Each service object is built once at process start from explicit
//! dependencies and handed to its HTTP router. Subscriptions run until the
//! service's shutdown token is cancelled.

use crate::config::TaskflowConfig;
use crate::events::{
    EventHandler, EventPublisher, MessageBus, Topic, UserId, adapters::InMemoryMessageBus,
    run_subscription,
};
use crate::notification::services::{ConnectionRegistry, ReminderDeliveryConsumer};
use crate::recurring::{ports::TaskCreationApi, services::TaskEventConsumer};
use crate::reminder::{
    adapters::memory::InMemoryReminderRepository,
    ports::JobScheduler,
    services::{JobTriggerHandler, ReminderOutcomeHandler, ReminderSchedulingService},
};
use crate::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository},
    domain::{Task, TaskId},
    services::{TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Task lifecycle service over the in-memory store.
pub type TaskService<C> = TaskLifecycleService<InMemoryTaskRepository, InMemoryAuditLog, C>;

/// Reminder scheduling service over the in-memory store.
pub type ReminderService<J, C> =
    ReminderSchedulingService<InMemoryTaskRepository, InMemoryReminderRepository, J, C>;

/// Job callback handler over the in-memory store.
pub type TriggerHandler = JobTriggerHandler<InMemoryReminderRepository, InMemoryTaskRepository>;

/// Delivery outcome handler over the in-memory store.
pub type OutcomeHandler<J, C> =
    ReminderOutcomeHandler<InMemoryReminderRepository, InMemoryTaskRepository, J, C>;

fn spawn_subscription<H>(
    bus: &InMemoryMessageBus,
    topic: Topic,
    handler: Arc<H>,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    H: EventHandler + 'static,
{
    let messages = bus.subscribe(topic);
    tokio::spawn(run_subscription(messages, handler, shutdown))
}

/// Tasks, reminders, and job callbacks.
pub struct Backend<J, C>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    tasks: TaskService<C>,
    reminders: ReminderService<J, C>,
    triggers: TriggerHandler,
    outcomes: Arc<OutcomeHandler<J, C>>,
    shutdown: CancellationToken,
}

impl<J, C> Backend<J, C>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Wires the backend around fresh in-memory stores.
    #[must_use]
    pub fn new(
        bus: Arc<dyn MessageBus>,
        jobs: Arc<J>,
        clock: Arc<C>,
        config: &TaskflowConfig,
    ) -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let reminders = Arc::new(InMemoryReminderRepository::new());
        let events = EventPublisher::new(
            bus,
            clock.clone(),
            UserId::new(config.sidecar.default_user_id.clone()),
        );
        let policy = config.reminders.clone();
        Self {
            tasks: TaskLifecycleService::new(
                tasks.clone(),
                Arc::new(InMemoryAuditLog::new()),
                events.clone(),
                clock.clone(),
            ),
            reminders: ReminderSchedulingService::new(
                tasks.clone(),
                reminders.clone(),
                jobs.clone(),
                events.clone(),
                clock.clone(),
                policy.clone(),
            ),
            triggers: JobTriggerHandler::new(reminders.clone(), tasks.clone(), events.clone()),
            outcomes: Arc::new(ReminderOutcomeHandler::new(
                reminders, tasks, jobs, events, clock, policy,
            )),
            shutdown: CancellationToken::new(),
        }
    }

    /// Task lifecycle operations.
    #[must_use]
    pub const fn tasks(&self) -> &TaskService<C> {
        &self.tasks
    }

    /// Reminder scheduling operations.
    #[must_use]
    pub const fn reminders(&self) -> &ReminderService<J, C> {
        &self.reminders
    }

    /// Scheduler callback handling.
    #[must_use]
    pub const fn triggers(&self) -> &TriggerHandler {
        &self.triggers
    }

    /// Consumer of `reminder.sent` and `reminder.failed`.
    #[must_use]
    pub fn outcomes(&self) -> Arc<OutcomeHandler<J, C>> {
        Arc::clone(&self.outcomes)
    }

    /// Token stopping the backend's subscriptions.
    #[must_use]
    pub const fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Deletes a task after purging its reminders and their jobs.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks or a
    /// repository error.
    pub async fn delete_task(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        if self.tasks.find_task(id).await?.is_none() {
            return Err(TaskLifecycleError::NotFound(id));
        }
        match self.reminders.purge_task_reminders(id).await {
            Ok(purged) => tracing::debug!(task_id = %id, purged, "reminders purged"),
            Err(err) => tracing::warn!(task_id = %id, error = %err, "failed to purge reminders"),
        }
        self.tasks.delete_task(id).await
    }

    /// Consumes delivery outcomes from an in-process bus.
    #[must_use]
    pub fn subscribe(&self, bus: &InMemoryMessageBus) -> JoinHandle<()> {
        spawn_subscription(bus, Topic::Reminders, self.outcomes(), self.shutdown.clone())
    }
}

/// Live connections and reminder delivery.
pub struct NotificationService {
    registry: Arc<ConnectionRegistry>,
    consumer: Arc<ReminderDeliveryConsumer>,
    shutdown: CancellationToken,
}

impl NotificationService {
    /// Wires the notification service.
    #[must_use]
    pub fn new(
        bus: Arc<dyn MessageBus>,
        clock: Arc<dyn Clock + Send + Sync>,
        config: &TaskflowConfig,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let events = EventPublisher::new(
            bus,
            clock,
            UserId::new(config.sidecar.default_user_id.clone()),
        );
        Self {
            consumer: Arc::new(ReminderDeliveryConsumer::new(registry.clone(), events)),
            registry,
            shutdown: CancellationToken::new(),
        }
    }

    /// Connection registry shared with the WebSocket endpoint.
    #[must_use]
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Consumer of `reminder.triggered`.
    #[must_use]
    pub fn consumer(&self) -> Arc<ReminderDeliveryConsumer> {
        Arc::clone(&self.consumer)
    }

    /// Token stopping the consumer.
    #[must_use]
    pub const fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Whether the consumer is still accepting events.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Consumes triggered reminders from an in-process bus.
    #[must_use]
    pub fn subscribe(&self, bus: &InMemoryMessageBus) -> JoinHandle<()> {
        spawn_subscription(bus, Topic::Reminders, self.consumer(), self.shutdown.clone())
    }
}

/// Worker filling in missing next occurrences.
pub struct RecurringWorker<A, C>
where
    A: TaskCreationApi + 'static,
    C: Clock + Send + Sync + 'static,
{
    consumer: Arc<TaskEventConsumer<A, C>>,
    shutdown: CancellationToken,
}

impl<A, C> RecurringWorker<A, C>
where
    A: TaskCreationApi + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Wires the worker around a task creation API.
    #[must_use]
    pub fn new(api: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            consumer: Arc::new(TaskEventConsumer::new(api, clock)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Consumer of `task.completed`.
    #[must_use]
    pub fn consumer(&self) -> Arc<TaskEventConsumer<A, C>> {
        Arc::clone(&self.consumer)
    }

    /// Token stopping the consumer.
    #[must_use]
    pub const fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Whether the consumer is still accepting events.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Consumes task events from an in-process bus.
    #[must_use]
    pub fn subscribe(&self, bus: &InMemoryMessageBus) -> JoinHandle<()> {
        spawn_subscription(bus, Topic::TaskEvents, self.consumer(), self.shutdown.clone())
    }
}
