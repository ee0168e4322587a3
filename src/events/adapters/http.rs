//! Sidecar pub/sub client.

use crate::config::SidecarConfig;
use crate::events::{
    domain::BusMessage,
    ports::{MessageBus, PublishError, PublishResult},
};
use async_trait::async_trait;

const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// Publishes through the sidecar's `POST /v1.0/publish/{pubsub}/{topic}` API.
#[derive(Debug, Clone)]
pub struct HttpMessageBus {
    client: reqwest::Client,
    base_url: String,
    pubsub_name: String,
}

impl HttpMessageBus {
    /// Builds a client for the configured sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: &SidecarConfig) -> PublishResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(PublishError::transport)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            pubsub_name: config.pubsub_name.clone(),
        })
    }

    fn publish_url(&self, message: &BusMessage) -> String {
        format!(
            "{}/v1.0/publish/{}/{}",
            self.base_url,
            self.pubsub_name,
            message.topic()
        )
    }
}

#[async_trait]
impl MessageBus for HttpMessageBus {
    async fn publish(&self, message: &BusMessage) -> PublishResult<()> {
        let response = self
            .client
            .post(self.publish_url(message))
            .header(CORRELATION_HEADER, message.correlation_id().to_string())
            .json(message.body())
            .send()
            .await
            .map_err(PublishError::transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(PublishError::Rejected {
            topic: message.topic(),
            status: status.as_u16(),
            body,
        })
    }
}
