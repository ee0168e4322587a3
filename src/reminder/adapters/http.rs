//! Sidecar jobs API client.

use crate::config::SidecarConfig;
use crate::reminder::{
    domain::{JobId, JobStatus, ReminderJob},
    ports::{JobScheduler, JobSchedulerError, JobSchedulerResult},
};
use async_trait::async_trait;
use reqwest::StatusCode;

/// Talks to `{base}/jobs/{id}` with `PUT`, `GET`, and `DELETE`.
#[derive(Debug, Clone)]
pub struct HttpJobScheduler {
    client: reqwest::Client,
    jobs_base_url: String,
}

impl HttpJobScheduler {
    /// Builds a client for the configured sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError::Transport`] when the HTTP client cannot
    /// be constructed.
    pub fn new(config: &SidecarConfig) -> JobSchedulerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(JobSchedulerError::transport)?;
        Ok(Self {
            client,
            jobs_base_url: config.jobs_base_url(),
        })
    }

    fn job_url(&self, job_id: &JobId) -> String {
        format!("{}/jobs/{job_id}", self.jobs_base_url)
    }

    async fn rejection(job_id: &JobId, response: reqwest::Response) -> JobSchedulerError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        JobSchedulerError::Rejected {
            job_id: job_id.clone(),
            status,
            body,
        }
    }
}

#[async_trait]
impl JobScheduler for HttpJobScheduler {
    async fn schedule(&self, job: &ReminderJob) -> JobSchedulerResult<()> {
        let response = self
            .client
            .put(self.job_url(&job.job_id))
            .json(job)
            .send()
            .await
            .map_err(JobSchedulerError::transport)?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
                tracing::info!(job_id = %job.job_id, due_time = %job.due_time, "reminder job scheduled");
                Ok(())
            }
            _ => Err(Self::rejection(&job.job_id, response).await),
        }
    }

    async fn status(&self, job_id: &JobId) -> JobSchedulerResult<Option<JobStatus>> {
        let response = self
            .client
            .get(self.job_url(job_id))
            .send()
            .await
            .map_err(JobSchedulerError::transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => {
                let mut status: JobStatus = response
                    .json()
                    .await
                    .map_err(|err| JobSchedulerError::InvalidResponse(err.to_string()))?;
                status.job_id = Some(job_id.clone());
                Ok(Some(status))
            }
            _ => Err(Self::rejection(job_id, response).await),
        }
    }

    async fn delete(&self, job_id: &JobId) -> JobSchedulerResult<()> {
        let response = self
            .client
            .delete(self.job_url(job_id))
            .send()
            .await
            .map_err(JobSchedulerError::transport)?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => {
                tracing::info!(job_id = %job_id, "reminder job deleted");
                Ok(())
            }
            _ => Err(Self::rejection(job_id, response).await),
        }
    }
}
