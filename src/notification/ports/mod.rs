//! Outbound delivery port.

use thiserror::Error;

/// Returned when a channel's receiving side has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("delivery channel closed")]
pub struct ChannelClosed;

/// One live connection a user can be notified on.
#[cfg_attr(test, mockall::automock)]
pub trait DeliveryChannel: Send + Sync {
    /// Queues a text frame for the user.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelClosed`] when the connection has ended.
    fn send(&self, text: &str) -> Result<(), ChannelClosed>;

    /// Returns `true` once the connection has ended.
    fn is_closed(&self) -> bool;
}
