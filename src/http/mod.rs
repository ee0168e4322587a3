//! HTTP surfaces of the three services.
//!
//! Each service exposes its own [`axum::Router`]. Sidecar push
//! subscriptions are declared on `GET /dapr/subscribe` and delivered as
//! `POST` requests whose response status tells the sidecar whether to
//! acknowledge, redeliver, or drop the message.

pub mod backend;
pub mod notification;
pub mod recurring;

use crate::events::{BusMessage, EventHandler, HandlerOutcome, Topic};
use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// One entry of the `GET /dapr/subscribe` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionDeclaration {
    /// Pub/sub component name.
    pub pubsubname: String,
    /// Topic to receive.
    pub topic: Topic,
    /// Local path messages are pushed to.
    pub route: &'static str,
}

/// Hands a pushed body to `handler` and reports the outcome to the sidecar.
///
/// Bodies without a recognisable envelope are dropped.
pub(crate) async fn deliver_push<H>(handler: &H, topic: Topic, body: Value) -> Json<Value>
where
    H: EventHandler + ?Sized,
{
    let outcome = match BusMessage::from_push_body(topic, body) {
        Ok(message) => handler.handle(&message).await,
        Err(err) => {
            tracing::warn!(topic = %topic, error = %err, "unrecognised push body");
            HandlerOutcome::Drop(err.to_string())
        }
    };
    Json(json!({ "status": outcome.delivery_status() }))
}

/// Resolves on Ctrl-C or when `token` is cancelled, cancelling `token`.
pub async fn shutdown_signal(token: CancellationToken) {
    let interrupted = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };
    tokio::select! {
        () = interrupted => {}
        () = token.cancelled() => {}
    }
    tracing::info!("shutting down");
    token.cancel();
}
