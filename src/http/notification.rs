//! Notification service routes: WebSocket connections, pushed reminder
//! events, health, and counters.

use super::{SubscriptionDeclaration, deliver_push};
use crate::app::NotificationService;
use crate::events::{Topic, UserId};
use crate::notification::{adapters::MpscDeliveryChannel, services::ConnectionRegistry};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::sync::Arc;

/// Path the sidecar pushes reminder events to.
pub const REMINDER_EVENTS_ROUTE: &str = "/events/reminders";

const PONG: &str = r#"{"type":"pong"}"#;

type Shared = State<Arc<NotificationService>>;

/// Builds the notification router.
pub fn router(service: Arc<NotificationService>, pubsub_name: &str) -> Router {
    let subscriptions = vec![SubscriptionDeclaration {
        pubsubname: pubsub_name.to_owned(),
        topic: Topic::Reminders,
        route: REMINDER_EVENTS_ROUTE,
    }];
    Router::new()
        .route(
            "/dapr/subscribe",
            get(move || std::future::ready(Json(subscriptions.clone()))),
        )
        .route(REMINDER_EVENTS_ROUTE, post(reminder_events))
        .route("/ws/{user_id}", get(websocket))
        .route("/notify/{user_id}", post(notify))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .with_state(service)
}

async fn reminder_events(State(service): Shared, Json(body): Json<Value>) -> Json<Value> {
    deliver_push(service.consumer().as_ref(), Topic::Reminders, body).await
}

async fn websocket(
    State(service): Shared,
    Path(user_id): Path<String>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let registry = service.registry();
    upgrade.on_upgrade(move |socket| serve_socket(socket, registry, UserId::new(user_id)))
}

async fn serve_socket(socket: WebSocket, registry: Arc<ConnectionRegistry>, user_id: UserId) {
    let (channel, mut frames) = MpscDeliveryChannel::open();
    let connection_id = registry.connect(&user_id, Arc::new(channel));
    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Some(text) = frame else { break };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) if text.as_str() == "ping" => {
                    if sink.send(Message::Text(PONG.into())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    registry.disconnect(&user_id, connection_id);
}

async fn notify(
    State(service): Shared,
    Path(user_id): Path<String>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let deliveries = service
        .registry()
        .send_to_user(&UserId::new(user_id), &payload.to_string());
    Json(json!({ "status": "sent", "deliveries": deliveries }))
}

async fn health(State(service): Shared) -> Json<Value> {
    let running = service.is_running();
    Json(json!({
        "status": if running { "healthy" } else { "degraded" },
        "consumer_running": running,
        "active_connections": service.registry().connection_count(),
    }))
}

async fn stats(State(service): Shared) -> Json<Value> {
    Json(json!(service.consumer().stats().snapshot()))
}
