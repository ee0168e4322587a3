//! HTTP surface tests for the three services, served on loopback ports.

use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use taskflow::app::{Backend, NotificationService, RecurringWorker};
use taskflow::clock::FixedClock;
use taskflow::config::TaskflowConfig;
use taskflow::events::{EventType, Topic, adapters::InMemoryMessageBus};
use taskflow::http;
use taskflow::recurring::adapters::HttpTaskApi;
use taskflow::reminder::adapters::memory::InMemoryJobScheduler;
use tokio::net::TcpListener;

struct Served {
    base: String,
    client: reqwest::Client,
}

impl Served {
    async fn start(app: axum::Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("loopback listener should bind");
        let addr = listener.local_addr().expect("listener has an address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .expect("request should complete");
        Self::read(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base))
            .json(body)
            .send()
            .await
            .expect("request should complete");
        Self::read(response).await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .delete(format!("{}{path}", self.base))
            .send()
            .await
            .expect("request should complete");
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> (StatusCode, Value) {
        let status = response.status();
        let body = response.json().await.expect("response should be JSON");
        (status, body)
    }
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
            .single()
            .expect("valid test timestamp"),
    ))
}

struct BackendApi {
    served: Served,
    jobs: Arc<InMemoryJobScheduler>,
}

async fn backend_api() -> BackendApi {
    let config = TaskflowConfig::default();
    let jobs = Arc::new(InMemoryJobScheduler::new());
    let backend = Arc::new(Backend::new(
        Arc::new(InMemoryMessageBus::new()),
        jobs.clone(),
        clock(),
        &config,
    ));
    let app = http::backend::router(backend, &config.sidecar.pubsub_name);
    BackendApi {
        served: Served::start(app).await,
        jobs,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn completing_a_recurring_task_over_http_extends_its_chain() {
    let api = backend_api().await;
    let (status, task) = api
        .served
        .post(
            "/api/tasks",
            &json!({
                "title": "Water plants",
                "priority": "high",
                "tags": ["Home"],
                "due_date": "2025-06-10T09:00:00Z",
                "recurrence": "every day",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = task["id"].as_i64().expect("task id should be numeric");

    let (_, completed) = api.served.post(&format!("/api/tasks/{id}/complete"), &json!({})).await;
    assert_eq!(completed["success"], true);
    assert_eq!(completed["is_recurring"], true);
    assert_eq!(completed["next_occurrence"]["due_date"], "2025-06-11T09:00:00Z");

    let (_, again) = api.served.post(&format!("/api/tasks/{id}/complete"), &json!({})).await;
    assert_eq!(again["success"], false);
    assert_eq!(again["error"], "task already completed");

    let (_, chain) = api.served.get(&format!("/api/tasks/{id}/chain")).await;
    assert_eq!(chain["count"], 2);

    let (_, preview) = api.served.get(&format!("/api/tasks/{id}/occurrences?count=3")).await;
    assert_eq!(
        preview["occurrences"],
        json!(["2025-06-11T09:00:00Z", "2025-06-12T09:00:00Z", "2025-06-13T09:00:00Z"])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_input_and_unknown_ids_are_reported() {
    let api = backend_api().await;

    let (status, body) = api.served.get("/api/tasks/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = api
        .served
        .post("/api/tasks", &json!({ "title": "Odd", "recurrence": "banana" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = api.served.delete("/api/reminders/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn reminder_jobs_fire_and_cancel_over_http() {
    let api = backend_api().await;
    let (_, task) = api
        .served
        .post(
            "/api/tasks",
            &json!({ "title": "Pay rent", "due_date": "2025-06-10T09:00:00Z" }),
        )
        .await;
    let task_id = task["id"].as_i64().expect("task id should be numeric");

    let (status, created) = api
        .served
        .post(
            &format!("/api/tasks/{task_id}/reminders"),
            &json!({ "offset_string": "1 hour before" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["scheduled"], true);
    assert_eq!(created["reminder"]["scheduled_at"], "2025-06-10T08:00:00Z");
    let reminder_id = created["reminder"]["id"]
        .as_i64()
        .expect("reminder id should be numeric");

    let job = api.jobs.jobs().pop().expect("a job should be registered");
    let data = serde_json::to_value(&job.data).expect("job data should encode");
    let (_, fired) = api.served.post("/api/jobs/trigger", &data).await;
    assert_eq!(fired, json!({ "status": "processed", "reminder_id": reminder_id }));

    let (_, foreign) = api
        .served
        .post("/api/jobs/trigger", &json!({ "type": "cleanup" }))
        .await;
    assert_eq!(foreign, json!({ "status": "ignored", "reason": "unknown_job_type" }));

    let (_, partial) = api
        .served
        .post("/api/jobs/trigger", &json!({ "type": "reminder" }))
        .await;
    assert_eq!(partial["reason"], "missing_required_fields");

    let (_, cancelled) = api.served.delete(&format!("/api/reminders/{reminder_id}")).await;
    assert_eq!(cancelled["success"], true);
    assert_eq!(cancelled["job_deleted"], true);

    let (_, repeated) = api.served.delete(&format!("/api/reminders/{reminder_id}")).await;
    assert_eq!(repeated["success"], false);
    assert_eq!(repeated["error"], "reminder already cancelled");
}

#[tokio::test(flavor = "multi_thread")]
async fn backend_declares_its_subscription_and_drops_unknown_pushes() {
    let api = backend_api().await;

    let (_, declared) = api.served.get("/dapr/subscribe").await;
    assert_eq!(
        declared,
        json!([{ "pubsubname": "kafka-pubsub", "topic": "reminders", "route": "/events/reminders" }])
    );

    let (status, pushed) = api.served.post("/events/reminders", &json!({ "foo": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pushed, json!({ "status": "DROP" }));

    let (_, health) = api.served.get("/api/jobs/health").await;
    assert_eq!(health["status"], "healthy");
}

#[tokio::test(flavor = "multi_thread")]
async fn notification_service_reports_undeliverable_reminders() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let config = TaskflowConfig::default();
    let service = Arc::new(NotificationService::new(bus.clone(), clock(), &config));
    let served = Served::start(http::notification::router(
        service,
        &config.sidecar.pubsub_name,
    ))
    .await;

    let cloud_event = json!({
        "specversion": "1.0",
        "type": "com.dapr.event.sent",
        "data": {
            "event_type": "reminder.triggered",
            "version": 1,
            "reminder_id": 5,
            "task_id": 9,
            "scheduled_at": "2025-06-10T08:00:00Z",
            "task_title": "Pay rent",
            "due_date": "2025-06-10T09:00:00Z",
            "status": "triggered",
            "user_id": "42",
            "timestamp": "2025-06-10T08:00:00Z",
            "correlation_id": "3f1c2a9e-7d4b-4e8a-9c1d-2b3e4f5a6b7c",
        },
    });
    let (_, pushed) = served.post("/events/reminders", &cloud_event).await;
    assert_eq!(pushed, json!({ "status": "SUCCESS" }));

    let (_, stats) = served.get("/stats").await;
    assert_eq!(stats["events_received"], 1);
    assert_eq!(stats["notifications_sent"], 0);

    let (_, health) = served.get("/health").await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["active_connections"], 0);

    let outcomes: Vec<EventType> = bus
        .published_on(Topic::Reminders)
        .iter()
        .map(|message| message.event_type())
        .collect();
    assert_eq!(outcomes, vec![EventType::ReminderFailed]);
}

#[tokio::test(flavor = "multi_thread")]
async fn recurring_worker_skips_pushed_non_recurring_completions() {
    // Nothing listens here; a non-recurring completion never calls out.
    let api = HttpTaskApi::new("http://127.0.0.1:9", std::time::Duration::from_secs(1))
        .expect("client should build");
    let worker = Arc::new(RecurringWorker::new(Arc::new(api), clock()));
    let served = Served::start(http::recurring::router(
        worker,
        &TaskflowConfig::default().sidecar.pubsub_name,
    ))
    .await;

    let (_, declared) = served.get("/dapr/subscribe").await;
    assert_eq!(declared[0]["topic"], "task-events");
    assert_eq!(declared[0]["route"], "/events/task-events");

    let completion = json!({
        "event_type": "task.completed",
        "task_id": 3,
        "task_data": { "title": "One-off", "recurrence": "none" },
        "user_id": "1",
        "timestamp": "2025-06-01T08:00:00Z",
        "correlation_id": "0b6c2a9e-7d4b-4e8a-9c1d-2b3e4f5a6b7c",
    });
    let (_, pushed) = served.post("/events/task-events", &completion).await;
    assert_eq!(pushed, json!({ "status": "SUCCESS" }));

    let (_, stats) = served.get("/stats").await;
    assert_eq!(stats["events_processed"], 1);
    assert_eq!(stats["skipped"], 1);
}
