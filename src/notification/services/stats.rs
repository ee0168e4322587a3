use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by the delivery consumer.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    events_received: AtomicU64,
    notifications_sent: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of [`DeliveryStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeliveryStatsSnapshot {
    /// Triggered reminders consumed.
    pub events_received: u64,
    /// Frames accepted by user connections.
    pub notifications_sent: u64,
    /// Messages that could not be processed.
    pub errors_count: u64,
}

impl DeliveryStats {
    pub(super) fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_sent(&self, deliveries: u64) {
        self.notifications_sent.fetch_add(deliveries, Ordering::Relaxed);
    }

    pub(super) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads the counters.
    #[must_use]
    pub fn snapshot(&self) -> DeliveryStatsSnapshot {
        DeliveryStatsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
            errors_count: self.errors.load(Ordering::Relaxed),
        }
    }
}
