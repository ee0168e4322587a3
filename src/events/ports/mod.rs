//! Port contract for the message bus.

mod bus;

pub use bus::{MessageBus, PublishError, PublishResult};
