//! Connection tracking and reminder delivery.

mod consumer;
mod registry;
mod stats;

pub use consumer::{NOT_CONNECTED, ReminderDeliveryConsumer};
pub use registry::ConnectionRegistry;
pub use stats::{DeliveryStats, DeliveryStatsSnapshot};
