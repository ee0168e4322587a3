//! Backend routes: tasks, reminders, scheduler callbacks, and delivery
//! outcome subscriptions.

use super::{SubscriptionDeclaration, deliver_push};
use crate::app::Backend;
use crate::events::Topic;
use crate::recurrence::{RECURRENCE_OPTIONS, RecurrenceParseError, parse_recurrence};
use crate::reminder::{
    domain::{JobTrigger, ReminderId},
    ports::JobScheduler,
    services::{CancelOutcome, CreateReminderRequest, ReminderSchedulingError},
};
use crate::task::{
    domain::{ParsePriorityError, Priority, TagSet, TaskChanges, TaskDomainError, TaskId, TaskTitle},
    services::{CompletionOutcome, CreateTaskRequest, TaskLifecycleError},
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Path the sidecar pushes reminder outcome events to.
pub const REMINDER_EVENTS_ROUTE: &str = "/events/reminders";

const DEFAULT_PREVIEW_COUNT: usize = 5;

type Shared<J, C> = State<Arc<Backend<J, C>>>;

/// JSON error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unprocessable(err: &impl std::error::Error) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }

    fn internal(err: &impl std::error::Error) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        match &err {
            TaskLifecycleError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            TaskLifecycleError::Domain(_) | TaskLifecycleError::Recurrence(_) => {
                Self::unprocessable(&err)
            }
            TaskLifecycleError::Repository(_) | TaskLifecycleError::Audit(_) => {
                Self::internal(&err)
            }
        }
    }
}

impl From<ReminderSchedulingError> for ApiError {
    fn from(err: ReminderSchedulingError) -> Self {
        match &err {
            ReminderSchedulingError::TaskNotFound(_)
            | ReminderSchedulingError::ReminderNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            ReminderSchedulingError::MissingDueDate(_) | ReminderSchedulingError::Domain(_) => {
                Self::unprocessable(&err)
            }
            ReminderSchedulingError::Reminders(_)
            | ReminderSchedulingError::Tasks(_)
            | ReminderSchedulingError::Scheduler(_) => Self::internal(&err),
        }
    }
}

impl From<TaskDomainError> for ApiError {
    fn from(err: TaskDomainError) -> Self {
        Self::unprocessable(&err)
    }
}

impl From<RecurrenceParseError> for ApiError {
    fn from(err: RecurrenceParseError) -> Self {
        Self::unprocessable(&err)
    }
}

impl From<ParsePriorityError> for ApiError {
    fn from(err: ParsePriorityError) -> Self {
        Self::unprocessable(&err)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TaskMetadataBody {
    #[serde(default)]
    parent_task_id: Option<TaskId>,
}

#[derive(Debug, Deserialize)]
struct CreateTaskBody {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    recurrence: Option<String>,
    #[serde(default)]
    metadata: TaskMetadataBody,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    recurrence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateReminderBody {
    #[serde(default)]
    scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    offset_minutes: Option<u32>,
    #[serde(default)]
    offset_string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    #[serde(default)]
    count: Option<usize>,
}

/// Builds the backend router.
pub fn router<J, C>(backend: Arc<Backend<J, C>>, pubsub_name: &str) -> Router
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let subscriptions = vec![SubscriptionDeclaration {
        pubsubname: pubsub_name.to_owned(),
        topic: Topic::Reminders,
        route: REMINDER_EVENTS_ROUTE,
    }];
    Router::new()
        .route("/api/tasks", post(create_task::<J, C>))
        .route(
            "/api/tasks/{id}",
            get(get_task::<J, C>)
                .patch(update_task::<J, C>)
                .delete(delete_task::<J, C>),
        )
        .route("/api/tasks/{id}/complete", post(complete_task::<J, C>))
        .route("/api/tasks/{id}/chain", get(task_chain::<J, C>))
        .route("/api/tasks/{id}/occurrences", get(preview_occurrences::<J, C>))
        .route(
            "/api/tasks/{id}/reminders",
            get(list_reminders::<J, C>).post(create_reminder::<J, C>),
        )
        .route("/api/reminders/{id}", delete(cancel_reminder::<J, C>))
        .route("/api/reminders/{id}/job", get(job_status::<J, C>))
        .route("/api/recurrence/options", get(recurrence_options))
        .route("/api/jobs/trigger", post(job_trigger::<J, C>))
        .route("/api/jobs/health", get(jobs_health))
        .route(
            "/dapr/subscribe",
            get(move || std::future::ready(Json(subscriptions.clone()))),
        )
        .route(REMINDER_EVENTS_ROUTE, post(reminder_events::<J, C>))
        .with_state(backend)
}

async fn create_task<J, C>(
    State(backend): Shared<J, C>,
    Json(body): Json<CreateTaskBody>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut request = CreateTaskRequest::new(body.title).with_tags(body.tags);
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    if let Some(priority) = body.priority.as_deref() {
        request = request.with_priority(Priority::try_from(priority)?);
    }
    if let Some(due_date) = body.due_date {
        request = request.with_due_date(due_date);
    }
    if let Some(recurrence) = body.recurrence {
        request = request.with_recurrence(recurrence);
    }
    if let Some(parent) = body.metadata.parent_task_id {
        request = request.with_parent(parent);
    }
    let task = backend.tasks().create_task(request).await?;
    Ok((StatusCode::CREATED, Json(task.snapshot())))
}

async fn get_task<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let task_id = TaskId::new(id);
    backend
        .tasks()
        .find_task(task_id)
        .await?
        .map(|task| Json(task.snapshot()))
        .ok_or_else(|| TaskLifecycleError::NotFound(task_id).into())
}

async fn update_task<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut changes = TaskChanges::new();
    if let Some(title) = body.title.as_deref() {
        changes = changes.with_title(TaskTitle::new(title)?);
    }
    if let Some(description) = body.description {
        changes = changes.with_description(Some(description));
    }
    if let Some(priority) = body.priority.as_deref() {
        changes = changes.with_priority(Priority::try_from(priority)?);
    }
    if let Some(tags) = &body.tags {
        changes = changes.with_tags(TagSet::parse(tags)?);
    }
    if let Some(due_date) = body.due_date {
        changes = changes.with_due_date(Some(due_date));
    }
    if let Some(recurrence) = body.recurrence.as_deref() {
        changes = changes.with_recurrence(parse_recurrence(recurrence)?);
    }
    let task = backend.tasks().update_task(TaskId::new(id), changes).await?;
    Ok(Json(task.snapshot()))
}

async fn delete_task<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let deleted = backend.delete_task(TaskId::new(id)).await?;
    Ok(Json(json!({ "deleted": true, "task": deleted.snapshot() })))
}

async fn complete_task<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let body = match backend.tasks().complete_task(TaskId::new(id)).await? {
        CompletionOutcome::Completed(completion) => json!({
            "success": true,
            "task": completion.task.snapshot(),
            "is_recurring": completion.is_recurring,
            "next_occurrence": completion.next_occurrence,
            "next_occurrence_error": completion.next_occurrence_error,
            "event_published": completion.event_published,
        }),
        CompletionOutcome::AlreadyCompleted(task) => json!({
            "success": false,
            "error": "task already completed",
            "task": task.snapshot(),
        }),
    };
    Ok(Json(body))
}

async fn task_chain<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let chain = backend.tasks().recurring_chain(TaskId::new(id)).await?;
    let tasks: Vec<Value> = chain.iter().map(|task| task.snapshot()).collect();
    Ok(Json(json!({ "count": tasks.len(), "tasks": tasks })))
}

async fn preview_occurrences<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let count = query.count.unwrap_or(DEFAULT_PREVIEW_COUNT);
    let dates = backend
        .tasks()
        .preview_occurrences(TaskId::new(id), count)
        .await?;
    Ok(Json(json!({ "occurrences": dates })))
}

async fn list_reminders<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let reminders = backend.reminders().reminders_for_task(TaskId::new(id)).await?;
    Ok(Json(json!({ "reminders": reminders })))
}

async fn create_reminder<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
    Json(body): Json<CreateReminderBody>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut request = CreateReminderRequest::new(TaskId::new(id));
    if let Some(scheduled_at) = body.scheduled_at {
        request = request.with_scheduled_at(scheduled_at);
    }
    if let Some(minutes) = body.offset_minutes {
        request = request.with_offset_minutes(minutes);
    }
    if let Some(offset) = body.offset_string {
        request = request.with_offset_string(offset);
    }
    let creation = backend.reminders().create_reminder(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "reminder": creation.reminder,
            "scheduled": creation.scheduling_error.is_none(),
            "scheduling_error": creation.scheduling_error,
            "event_published": creation.event_published,
        })),
    ))
}

async fn cancel_reminder<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let body = match backend.reminders().cancel_reminder(ReminderId::new(id)).await? {
        CancelOutcome::Cancelled {
            reminder,
            job_deleted,
            event_published,
        } => json!({
            "success": true,
            "reminder": reminder,
            "job_deleted": job_deleted,
            "event_published": event_published,
        }),
        CancelOutcome::AlreadyTerminal(reminder) => json!({
            "success": false,
            "error": format!("reminder already {}", reminder.status().as_str()),
            "reminder": reminder,
        }),
    };
    Ok(Json(body))
}

async fn job_status<J, C>(
    State(backend): Shared<J, C>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    let status = backend.reminders().job_status(ReminderId::new(id)).await?;
    Ok(Json(json!({ "job": status })))
}

async fn recurrence_options() -> Json<Value> {
    Json(json!({ "options": RECURRENCE_OPTIONS }))
}

async fn job_trigger<J, C>(
    State(backend): Shared<J, C>,
    Json(trigger): Json<JobTrigger>,
) -> Response
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    match backend.triggers().handle(&trigger).await {
        Ok(outcome) => {
            let mut body = Map::new();
            body.insert("status".to_owned(), json!(outcome.status()));
            if let Some(reason) = outcome.reason() {
                body.insert("reason".to_owned(), json!(reason));
            }
            if let Some(reminder_id) = trigger.reminder_id {
                body.insert("reminder_id".to_owned(), json!(reminder_id));
            }
            Json(Value::Object(body)).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "job trigger failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "reason": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn jobs_health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "reminder-jobs" }))
}

async fn reminder_events<J, C>(State(backend): Shared<J, C>, Json(body): Json<Value>) -> Json<Value>
where
    J: JobScheduler + 'static,
    C: Clock + Send + Sync + 'static,
{
    deliver_push(backend.outcomes().as_ref(), Topic::Reminders, body).await
}
