//! Recurring-task worker routes.

use super::{SubscriptionDeclaration, deliver_push};
use crate::app::RecurringWorker;
use crate::events::Topic;
use crate::recurring::ports::TaskCreationApi;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use mockable::Clock;
use serde_json::{Value, json};
use std::sync::Arc;

/// Path the sidecar pushes task events to.
pub const TASK_EVENTS_ROUTE: &str = "/events/task-events";

type Shared<A, C> = State<Arc<RecurringWorker<A, C>>>;

/// Builds the worker router.
pub fn router<A, C>(worker: Arc<RecurringWorker<A, C>>, pubsub_name: &str) -> Router
where
    A: TaskCreationApi + 'static,
    C: Clock + Send + Sync + 'static,
{
    let subscriptions = vec![SubscriptionDeclaration {
        pubsubname: pubsub_name.to_owned(),
        topic: Topic::TaskEvents,
        route: TASK_EVENTS_ROUTE,
    }];
    Router::new()
        .route(
            "/dapr/subscribe",
            get(move || std::future::ready(Json(subscriptions.clone()))),
        )
        .route(TASK_EVENTS_ROUTE, post(task_events::<A, C>))
        .route("/health", get(health::<A, C>))
        .route("/stats", get(stats::<A, C>))
        .with_state(worker)
}

async fn task_events<A, C>(State(worker): Shared<A, C>, Json(body): Json<Value>) -> Json<Value>
where
    A: TaskCreationApi + 'static,
    C: Clock + Send + Sync + 'static,
{
    deliver_push(worker.consumer().as_ref(), Topic::TaskEvents, body).await
}

async fn health<A, C>(State(worker): Shared<A, C>) -> Json<Value>
where
    A: TaskCreationApi + 'static,
    C: Clock + Send + Sync + 'static,
{
    let running = worker.is_running();
    Json(json!({
        "status": if running { "healthy" } else { "degraded" },
        "consumer_running": running,
    }))
}

async fn stats<A, C>(State(worker): Shared<A, C>) -> Json<Value>
where
    A: TaskCreationApi + 'static,
    C: Clock + Send + Sync + 'static,
{
    Json(json!(worker.consumer().stats().snapshot()))
}
