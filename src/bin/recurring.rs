//! Recurring-task worker: creates the next occurrence of completed
//! recurring tasks through the backend API.

use mockable::DefaultClock;
use std::sync::Arc;
use taskflow::app::RecurringWorker;
use taskflow::config::TaskflowConfig;
use taskflow::recurring::adapters::HttpTaskApi;
use taskflow::{http, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TaskflowConfig::from_env()?;
    telemetry::init_tracing(&config.logging.filter)?;

    let api = HttpTaskApi::new(
        &config.recurring.backend_base_url,
        config.sidecar.request_timeout(),
    )?;
    let worker = Arc::new(RecurringWorker::new(Arc::new(api), Arc::new(DefaultClock)));
    let shutdown = worker.shutdown_token().clone();

    let app = http::recurring::router(Arc::clone(&worker), &config.sidecar.pubsub_name);
    let listener = TcpListener::bind(&config.server.recurring_addr).await?;
    tracing::info!(addr = %config.server.recurring_addr, "recurring worker listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(http::shutdown_signal(shutdown))
        .await?;
    Ok(())
}
