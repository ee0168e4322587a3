//! Shared wiring for reminder service tests.

use std::sync::Arc;

use crate::clock::FixedClock;
use crate::events::{EventPublisher, UserId, adapters::InMemoryMessageBus};
use crate::reminder::adapters::memory::{InMemoryJobScheduler, InMemoryReminderRepository};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, Task, TaskTitle},
    ports::TaskRepository,
};
use chrono::{DateTime, TimeZone, Utc};

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid test timestamp")
}

/// 2025-06-10 09:00 UTC.
pub(super) fn due() -> DateTime<Utc> {
    at(2025, 6, 10, 9)
}

pub(super) struct Harness {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub reminders: Arc<InMemoryReminderRepository>,
    pub jobs: Arc<InMemoryJobScheduler>,
    pub bus: Arc<InMemoryMessageBus>,
    pub clock: Arc<FixedClock>,
    pub events: EventPublisher,
}

impl Harness {
    pub fn new() -> Self {
        let bus = Arc::new(InMemoryMessageBus::new());
        let clock = Arc::new(FixedClock::new(at(2025, 6, 1, 8)));
        let events = EventPublisher::new(bus.clone(), clock.clone(), UserId::new("1"));
        Self {
            tasks: Arc::new(InMemoryTaskRepository::new()),
            reminders: Arc::new(InMemoryReminderRepository::new()),
            jobs: Arc::new(InMemoryJobScheduler::new()),
            bus,
            clock,
            events,
        }
    }

    pub async fn task(&self, title: &str, due_date: Option<DateTime<Utc>>) -> Task {
        let new_task = NewTask::new(TaskTitle::new(title).expect("valid title"), &*self.clock)
            .with_due_date(due_date);
        self.tasks
            .insert(new_task)
            .await
            .expect("task insert should succeed")
    }
}
