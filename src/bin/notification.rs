//! Notification service: WebSocket connections and triggered reminder
//! delivery.

use mockable::DefaultClock;
use std::sync::Arc;
use taskflow::app::NotificationService;
use taskflow::config::TaskflowConfig;
use taskflow::events::adapters::HttpMessageBus;
use taskflow::{http, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TaskflowConfig::from_env()?;
    telemetry::init_tracing(&config.logging.filter)?;

    let bus = Arc::new(HttpMessageBus::new(&config.sidecar)?);
    let service = Arc::new(NotificationService::new(
        bus,
        Arc::new(DefaultClock),
        &config,
    ));
    let shutdown = service.shutdown_token().clone();

    let app = http::notification::router(Arc::clone(&service), &config.sidecar.pubsub_name);
    let listener = TcpListener::bind(&config.server.notification_addr).await?;
    tracing::info!(addr = %config.server.notification_addr, "notification service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(http::shutdown_signal(shutdown))
        .await?;
    Ok(())
}
