//! Identifier types for reminders and their scheduler jobs.

use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Storage-assigned identifier of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(i64);

impl ReminderId {
    /// Wraps a storage identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a job registered with the external scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    const HASH_BYTES: usize = 6;

    /// Derives the job id for one scheduling attempt of a reminder.
    ///
    /// The id embeds the task and reminder ids, so two reminders never share
    /// a job. The hash suffix covers the fire time and attempt number, so a
    /// rescheduled retry gets a fresh job instead of overwriting the old one.
    #[must_use]
    pub fn for_reminder(
        task_id: TaskId,
        reminder_id: ReminderId,
        scheduled_at: DateTime<Utc>,
        attempt: u32,
    ) -> Self {
        let digest = Sha256::digest(
            format!(
                "{task_id}:{reminder_id}:{}:{attempt}",
                scheduled_at.to_rfc3339()
            )
            .as_bytes(),
        );
        let hash: String = digest
            .iter()
            .take(Self::HASH_BYTES)
            .map(|byte| format!("{byte:02x}"))
            .collect();
        Self(format!("reminder-{task_id}-{reminder_id}-{hash}"))
    }

    /// Wraps an id returned by the scheduler or storage.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
