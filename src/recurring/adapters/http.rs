//! Backend task API client.

use crate::recurring::{
    domain::NextOccurrenceRequest,
    ports::{TaskApiError, TaskApiResult, TaskCreationApi},
};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct CreatedTask {
    id: TaskId,
}

/// Calls `POST {backend}/api/tasks`.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    tasks_url: String,
}

impl HttpTaskApi {
    /// Builds a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskApiError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str, timeout: Duration) -> TaskApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TaskApiError::transport)?;
        Ok(Self {
            client,
            tasks_url: format!("{}/api/tasks", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl TaskCreationApi for HttpTaskApi {
    async fn create_next_occurrence(
        &self,
        request: &NextOccurrenceRequest,
    ) -> TaskApiResult<TaskId> {
        let response = self
            .client
            .post(&self.tasks_url)
            .json(request)
            .send()
            .await
            .map_err(TaskApiError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TaskApiError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let created: CreatedTask = response
            .json()
            .await
            .map_err(|err| TaskApiError::InvalidResponse(err.to_string()))?;
        Ok(created.id)
    }
}
