//! In-process message bus.

use crate::events::{
    domain::{BusMessage, Topic},
    ports::{MessageBus, PublishError, PublishResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Records every published message and forwards it to topic subscribers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageBus {
    state: Arc<Mutex<BusState>>,
}

#[derive(Debug, Default)]
struct BusState {
    published: Vec<BusMessage>,
    subscribers: HashMap<Topic, Vec<mpsc::UnboundedSender<BusMessage>>>,
    failure: Option<String>,
}

impl InMemoryMessageBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a subscription receiving every later message on `topic`.
    #[must_use]
    pub fn subscribe(&self, topic: Topic) -> mpsc::UnboundedReceiver<BusMessage> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().subscribers.entry(topic).or_default().push(sender);
        receiver
    }

    /// Makes every later publish fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.lock().failure = Some(reason.into());
    }

    /// Clears a failure set by [`Self::fail_with`].
    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Returns every message published so far.
    #[must_use]
    pub fn published(&self) -> Vec<BusMessage> {
        self.lock().published.clone()
    }

    /// Returns messages published on `topic`.
    #[must_use]
    pub fn published_on(&self, topic: Topic) -> Vec<BusMessage> {
        self.lock()
            .published
            .iter()
            .filter(|message| message.topic() == topic)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, message: &BusMessage) -> PublishResult<()> {
        let mut state = self.lock();
        if let Some(reason) = &state.failure {
            return Err(PublishError::Unavailable(reason.clone()));
        }
        state.published.push(message.clone());
        if let Some(senders) = state.subscribers.get_mut(&message.topic()) {
            senders.retain(|sender| sender.send(message.clone()).is_ok());
        }
        Ok(())
    }
}
