//! Shared wiring for the pipeline tests.

use chrono::{DateTime, TimeZone, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use taskflow::app::{Backend, NotificationService};
use taskflow::clock::FixedClock;
use taskflow::config::TaskflowConfig;
use taskflow::events::adapters::InMemoryMessageBus;
use taskflow::reminder::{
    adapters::memory::InMemoryJobScheduler,
    domain::{JobId, JobTrigger, REMINDER_JOB_TYPE, Reminder},
    services::TriggerOutcome,
};
use tokio::task::JoinHandle;

/// 2025-06-10 09:00 UTC.
pub fn due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0)
        .single()
        .expect("valid test timestamp")
}

/// Backend and notification service sharing one bus.
pub struct Pipeline {
    pub bus: Arc<InMemoryMessageBus>,
    pub jobs: Arc<InMemoryJobScheduler>,
    pub clock: Arc<FixedClock>,
    pub backend: Backend<InMemoryJobScheduler, FixedClock>,
    pub notifications: NotificationService,
    subscriptions: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Wires both services and starts their subscriptions.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start() -> Self {
        let bus = Arc::new(InMemoryMessageBus::new());
        let jobs = Arc::new(InMemoryJobScheduler::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
                .single()
                .expect("valid test timestamp"),
        ));
        let config = TaskflowConfig::default();
        let backend = Backend::new(bus.clone(), jobs.clone(), clock.clone(), &config);
        let notifications = NotificationService::new(bus.clone(), clock.clone(), &config);
        let subscriptions = vec![backend.subscribe(&bus), notifications.subscribe(&bus)];
        Self {
            bus,
            jobs,
            clock,
            backend,
            notifications,
            subscriptions,
        }
    }

    /// Fires a registered job the way the scheduler callback would.
    pub async fn fire(&self, job_id: &JobId) -> TriggerOutcome {
        let job = self.jobs.take_job(job_id).expect("job should be registered");
        let trigger = JobTrigger {
            job_type: Some(job.data.job_type),
            task_id: Some(job.data.task_id),
            reminder_id: Some(job.data.reminder_id),
            scheduled_at: Some(job.data.scheduled_at),
        };
        self.backend
            .triggers()
            .handle(&trigger)
            .await
            .expect("trigger handling should succeed")
    }

    /// Reloads a reminder from the backend.
    pub async fn reminder(&self, reminder: &Reminder) -> Reminder {
        self.backend
            .reminders()
            .find_reminder(reminder.id())
            .await
            .expect("reminder lookup should succeed")
            .expect("reminder should exist")
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.backend.shutdown_token().cancel();
        self.notifications.shutdown_token().cancel();
        for handle in &self.subscriptions {
            handle.abort();
        }
    }
}

/// Trigger body for a reminder whose job may already be gone.
pub fn trigger_for(reminder: &Reminder) -> JobTrigger {
    JobTrigger {
        job_type: Some(REMINDER_JOB_TYPE.to_owned()),
        task_id: Some(reminder.task_id()),
        reminder_id: Some(reminder.id()),
        scheduled_at: Some(reminder.scheduled_at()),
    }
}

/// Polls `probe` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if probe().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
