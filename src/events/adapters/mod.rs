//! Message bus implementations.

mod http;
mod memory;

pub use http::HttpMessageBus;
pub use memory::InMemoryMessageBus;
