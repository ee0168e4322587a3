//! Wire shapes exchanged with the external job scheduler.

use super::{JobId, ReminderId};
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Job type tag for reminder jobs.
pub const REMINDER_JOB_TYPE: &str = "reminder";

/// Data echoed back to the trigger callback when a job fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobData {
    /// Always [`REMINDER_JOB_TYPE`] for jobs created here.
    #[serde(rename = "type")]
    pub job_type: String,
    /// Owning task.
    pub task_id: TaskId,
    /// Reminder to deliver.
    pub reminder_id: ReminderId,
    /// Intended fire time.
    pub scheduled_at: DateTime<Utc>,
    /// Task title at scheduling time.
    pub task_title: String,
    /// Task description at scheduling time.
    pub task_description: Option<String>,
    /// Task priority at scheduling time.
    pub priority: String,
    /// Offset before the due date, when derived from one.
    pub offset_minutes: Option<u32>,
}

/// A one-shot job to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderJob {
    /// Job handle.
    #[serde(skip)]
    pub job_id: JobId,
    /// When the job fires.
    #[serde(rename = "dueTime")]
    pub due_time: DateTime<Utc>,
    /// Callback payload.
    pub data: JobData,
}

/// Body of the trigger callback. Fields are optional so malformed
/// callbacks can be acknowledged instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTrigger {
    /// Job type tag.
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    /// Owning task.
    #[serde(default)]
    pub task_id: Option<TaskId>,
    /// Reminder to deliver.
    #[serde(default)]
    pub reminder_id: Option<ReminderId>,
    /// Intended fire time.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Scheduler view of a registered job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Job handle.
    #[serde(skip)]
    pub job_id: Option<JobId>,
    /// Configured fire time.
    #[serde(rename = "dueTime", default)]
    pub due_time: Option<String>,
    /// Recurring schedule, if any.
    #[serde(default)]
    pub schedule: Option<String>,
    /// Scheduler-reported status.
    #[serde(default)]
    pub status: Option<String>,
    /// Stored callback payload.
    #[serde(default)]
    pub data: Option<Value>,
}
