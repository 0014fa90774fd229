//! Async message bus between the channels and the command router.
//!
//! Two bounded tokio mpsc lanes: webhook events flow in, deliveries flow out.

use tokio::sync::{mpsc, Mutex};

use super::types::{InboundMessage, OutboundMessage};

/// One direction of the bus. The receiver sits behind an async mutex so a
/// shared `&MessageBus` can consume.
struct Lane<T> {
    tx: mpsc::Sender<T>,
    rx: Mutex<mpsc::Receiver<T>>,
}

impl<T> Lane<T> {
    fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self { tx, rx: Mutex::new(rx) }
    }

    async fn recv(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }
}

/// The message bus connecting channels ↔ command router.
///
/// The LINE webhook publishes user texts inbound; the router answers each one
/// outbound; the channel manager drains outbound and sends.
pub struct MessageBus {
    inbound: Lane<InboundMessage>,
    outbound: Lane<OutboundMessage>,
}

impl MessageBus {
    /// Create a bus whose lanes each hold up to `capacity` pending messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            inbound: Lane::with_capacity(capacity),
            outbound: Lane::with_capacity(capacity),
        }
    }

    /// Queue a user message for the router. Waits while the lane is full.
    pub async fn publish_inbound(
        &self,
        msg: InboundMessage,
    ) -> Result<(), mpsc::error::SendError<InboundMessage>> {
        self.inbound.tx.send(msg).await
    }

    /// Next user message, in arrival order.
    pub async fn consume_inbound(&self) -> Option<InboundMessage> {
        self.inbound.recv().await
    }

    /// Queue a delivery for the channels.
    pub async fn publish_outbound(
        &self,
        msg: OutboundMessage,
    ) -> Result<(), mpsc::error::SendError<OutboundMessage>> {
        self.outbound.tx.send(msg).await
    }

    /// Next delivery, in the order the router produced them.
    pub async fn consume_outbound(&self) -> Option<OutboundMessage> {
        self.outbound.recv().await
    }

    /// A detached inbound sender, for HTTP handlers that outlive a borrow.
    pub fn inbound_sender(&self) -> mpsc::Sender<InboundMessage> {
        self.inbound.tx.clone()
    }
}
