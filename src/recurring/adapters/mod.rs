//! Task creation API implementations.

mod http;
mod local;

pub use http::HttpTaskApi;
pub use local::LifecycleTaskApi;
