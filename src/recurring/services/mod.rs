//! Task event consumption.

mod consumer;
mod stats;

pub use consumer::{SkipReason, TaskEventConsumer};
pub use stats::{WorkerStats, WorkerStatsSnapshot};
