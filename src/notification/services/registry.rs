//! Live delivery channels per user.

use crate::events::UserId;
use crate::notification::{domain::ConnectionId, ports::DeliveryChannel};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type UserChannels = HashMap<ConnectionId, Arc<dyn DeliveryChannel>>;

/// Registry of the connections each user currently has open.
///
/// Connects, disconnects, and sends may race. A send that finds a closed
/// channel removes it instead of failing.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, UserChannels>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<UserId, UserChannels>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, UserChannels>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a channel for `user_id`.
    pub fn connect(&self, user_id: &UserId, channel: Arc<dyn DeliveryChannel>) -> ConnectionId {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut connections = self.write();
        let channels = connections.entry(user_id.clone()).or_default();
        channels.insert(id, channel);
        tracing::info!(user_id = %user_id, connection_id = %id, open = channels.len(), "user connected");
        id
    }

    /// Removes one connection. Unknown ids are ignored.
    pub fn disconnect(&self, user_id: &UserId, connection_id: ConnectionId) {
        let mut connections = self.write();
        let Some(channels) = connections.get_mut(user_id) else {
            return;
        };
        channels.remove(&connection_id);
        if channels.is_empty() {
            connections.remove(user_id);
            tracing::info!(user_id = %user_id, "user disconnected");
        }
    }

    /// Sends `text` to every open connection of `user_id`.
    ///
    /// Returns the number of connections that accepted the frame.
    pub fn send_to_user(&self, user_id: &UserId, text: &str) -> usize {
        let mut connections = self.write();
        let Some(channels) = connections.get_mut(user_id) else {
            return 0;
        };
        let before = channels.len();
        channels.retain(|_, channel| channel.send(text).is_ok());
        let delivered = channels.len();
        if delivered < before {
            tracing::debug!(
                user_id = %user_id,
                dropped = before - delivered,
                "removed closed connections"
            );
        }
        if channels.is_empty() {
            connections.remove(user_id);
        }
        delivered
    }

    /// Returns `true` when `user_id` has at least one open connection.
    #[must_use]
    pub fn is_connected(&self, user_id: &UserId) -> bool {
        self.read()
            .get(user_id)
            .is_some_and(|channels| channels.values().any(|channel| !channel.is_closed()))
    }

    /// Total registered connections across all users.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.read().values().map(HashMap::len).sum()
    }
}
