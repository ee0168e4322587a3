//! Typed publishing and subscription loops.

mod publisher;
mod subscription;

pub use publisher::EventPublisher;
pub use subscription::{EventHandler, HandlerOutcome, run_subscription};
