//! In-memory job scheduler that can fire jobs on demand.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::reminder::{
    domain::{JobId, JobStatus, ReminderJob},
    ports::{JobScheduler, JobSchedulerError, JobSchedulerResult},
};

/// Keeps registered jobs in memory.
///
/// Tests and local runs fire jobs explicitly with [`Self::take_job`] and pass
/// the data to the trigger handler.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobScheduler {
    state: Arc<Mutex<SchedulerState>>,
}

#[derive(Debug, Default)]
struct SchedulerState {
    jobs: BTreeMap<String, ReminderJob>,
    deleted: Vec<JobId>,
    failure: Option<String>,
}

impl InMemoryJobScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every later call fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.lock().failure = Some(reason.into());
    }

    /// Clears a failure set by [`Self::fail_with`].
    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Returns the registered jobs ordered by id.
    #[must_use]
    pub fn jobs(&self) -> Vec<ReminderJob> {
        self.lock().jobs.values().cloned().collect()
    }

    /// Returns ids passed to [`JobScheduler::delete`].
    #[must_use]
    pub fn deleted(&self) -> Vec<JobId> {
        self.lock().deleted.clone()
    }

    /// Removes and returns a job, as the scheduler does when it fires.
    #[must_use]
    pub fn take_job(&self, job_id: &JobId) -> Option<ReminderJob> {
        self.lock().jobs.remove(job_id.as_str())
    }

    fn check_available(state: &SchedulerState) -> JobSchedulerResult<()> {
        match &state.failure {
            Some(reason) => Err(JobSchedulerError::transport(std::io::Error::other(
                reason.clone(),
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl JobScheduler for InMemoryJobScheduler {
    async fn schedule(&self, job: &ReminderJob) -> JobSchedulerResult<()> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state
            .jobs
            .insert(job.job_id.as_str().to_owned(), job.clone());
        Ok(())
    }

    async fn status(&self, job_id: &JobId) -> JobSchedulerResult<Option<JobStatus>> {
        let state = self.lock();
        Self::check_available(&state)?;
        Ok(state.jobs.get(job_id.as_str()).map(|job| JobStatus {
            job_id: Some(job.job_id.clone()),
            due_time: Some(job.due_time.to_rfc3339()),
            schedule: None,
            status: Some("scheduled".to_owned()),
            data: serde_json::to_value(&job.data).ok(),
        }))
    }

    async fn delete(&self, job_id: &JobId) -> JobSchedulerResult<()> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state.jobs.remove(job_id.as_str());
        state.deleted.push(job_id.clone());
        Ok(())
    }
}
