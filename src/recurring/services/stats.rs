use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Counters kept by the task event consumer.
#[derive(Debug, Default)]
pub struct WorkerStats {
    events_processed: AtomicU64,
    tasks_created: AtomicU64,
    skipped: AtomicU64,
    errors: AtomicU64,
    last_event_at: Mutex<Option<DateTime<Utc>>>,
}

/// Point-in-time copy of [`WorkerStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WorkerStatsSnapshot {
    /// `task.completed` events examined.
    pub events_processed: u64,
    /// Occurrences created by the worker.
    pub tasks_created: u64,
    /// Completions that needed no action.
    pub skipped: u64,
    /// Events that failed.
    pub errors_count: u64,
    /// When the last completion was examined.
    pub last_event_at: Option<DateTime<Utc>>,
}

impl WorkerStats {
    pub(super) fn record_processed(&self, at: DateTime<Utc>) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        *self
            .last_event_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(at);
    }

    pub(super) fn record_created(&self) {
        self.tasks_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads the counters.
    #[must_use]
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            events_processed: self.events_processed.load(Ordering::Relaxed),
            tasks_created: self.tasks_created.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errors_count: self.errors.load(Ordering::Relaxed),
            last_event_at: *self
                .last_event_at
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}
