//! Consumer side of the bus.

use crate::events::domain::BusMessage;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What a handler asks the bus to do with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Processed or deliberately skipped; acknowledge.
    Handled,
    /// Failed for a reason that may clear; redeliver.
    Retry(String),
    /// Can never be processed; discard.
    Drop(String),
}

impl HandlerOutcome {
    /// Sidecar subscription response status.
    #[must_use]
    pub const fn delivery_status(&self) -> &'static str {
        match self {
            Self::Handled => "SUCCESS",
            Self::Retry(_) => "RETRY",
            Self::Drop(_) => "DROP",
        }
    }
}

/// Processes messages delivered from a topic subscription.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one message.
    async fn handle(&self, message: &BusMessage) -> HandlerOutcome;
}

/// Feeds messages from `messages` to `handler` until the channel closes or
/// `shutdown` is cancelled.
pub async fn run_subscription<H>(
    mut messages: mpsc::UnboundedReceiver<BusMessage>,
    handler: Arc<H>,
    shutdown: CancellationToken,
) where
    H: EventHandler + ?Sized,
{
    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                tracing::info!("subscription shutting down");
                break;
            }
            next = messages.recv() => {
                let Some(message) = next else {
                    tracing::info!("subscription channel closed");
                    break;
                };
                match handler.handle(&message).await {
                    HandlerOutcome::Handled => {}
                    HandlerOutcome::Retry(reason) => tracing::warn!(
                        topic = %message.topic(),
                        event_type = %message.event_type(),
                        reason = %reason,
                        "handler requested redelivery"
                    ),
                    HandlerOutcome::Drop(reason) => tracing::warn!(
                        topic = %message.topic(),
                        event_type = %message.event_type(),
                        reason = %reason,
                        "handler dropped message"
                    ),
                }
            }
        }
    }
}
