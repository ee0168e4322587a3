//! Shared world state for recurring completion BDD scenarios.

use chrono::{TimeZone, Utc};
use rstest::fixture;
use std::sync::Arc;
use taskflow::app::TaskService;
use taskflow::clock::FixedClock;
use taskflow::events::{EventPublisher, UserId, adapters::InMemoryMessageBus};
use taskflow::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository},
    domain::Task,
    services::{CompletionOutcome, TaskLifecycleService},
};

/// Scenario world for recurring completion behaviour tests.
pub struct CompletionWorld {
    pub service: TaskService<FixedClock>,
    pub bus: Arc<InMemoryMessageBus>,
    pub task: Option<Task>,
    pub completions: Vec<CompletionOutcome>,
}

impl CompletionWorld {
    /// Creates a world with an empty store and a clock frozen at New Year.
    #[must_use]
    pub fn new() -> Self {
        let bus = Arc::new(InMemoryMessageBus::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("valid scenario timestamp"),
        ));
        let events = EventPublisher::new(bus.clone(), clock.clone(), UserId::new("1"));
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryAuditLog::new()),
            events,
            clock,
        );
        Self {
            service,
            bus,
            task: None,
            completions: Vec::new(),
        }
    }

    /// The task created by the `Given` step.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for CompletionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CompletionWorld {
    CompletionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
