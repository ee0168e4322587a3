//! Backend service: task and reminder API, scheduler callbacks, and the
//! reminder outcome subscription.
//!
//! Configuration is read from the TOML file named by `TASKFLOW_CONFIG`;
//! every setting has a default.

use mockable::DefaultClock;
use std::sync::Arc;
use taskflow::app::Backend;
use taskflow::config::TaskflowConfig;
use taskflow::events::adapters::HttpMessageBus;
use taskflow::reminder::adapters::HttpJobScheduler;
use taskflow::{http, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TaskflowConfig::from_env()?;
    telemetry::init_tracing(&config.logging.filter)?;

    let bus = Arc::new(HttpMessageBus::new(&config.sidecar)?);
    let jobs = Arc::new(HttpJobScheduler::new(&config.sidecar)?);
    let backend = Arc::new(Backend::new(bus, jobs, Arc::new(DefaultClock), &config));
    let shutdown = backend.shutdown_token().clone();

    let app = http::backend::router(Arc::clone(&backend), &config.sidecar.pubsub_name);
    let listener = TcpListener::bind(&config.server.backend_addr).await?;
    tracing::info!(addr = %config.server.backend_addr, "backend listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(http::shutdown_signal(shutdown))
        .await?;
    Ok(())
}
