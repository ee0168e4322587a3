//! Delivery channel implementations.

use crate::notification::ports::{ChannelClosed, DeliveryChannel};
use tokio::sync::mpsc;

/// Delivery channel backed by an unbounded queue.
///
/// The WebSocket handler owns the receiving side and forwards frames to the
/// socket; dropping the receiver closes the channel.
#[derive(Debug, Clone)]
pub struct MpscDeliveryChannel {
    sender: mpsc::UnboundedSender<String>,
}

impl MpscDeliveryChannel {
    /// Creates a channel and the receiver its frames arrive on.
    #[must_use]
    pub fn open() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl DeliveryChannel for MpscDeliveryChannel {
    fn send(&self, text: &str) -> Result<(), ChannelClosed> {
        self.sender.send(text.to_owned()).map_err(|_| ChannelClosed)
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
