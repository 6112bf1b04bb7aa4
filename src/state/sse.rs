use tokio::sync::broadcast;
use tracing::trace;

use crate::dto::sse::ServerEvent;

/// Fan-out of public events to every connected SSE client.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Hub keeping at most `capacity` events for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event broadcast from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Send `event` to the current subscribers; returns how many received it.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        let name = event.event.clone();
        // Sending only fails when nobody listens.
        let delivered = self.sender.send(event).unwrap_or(0);
        trace!(event = ?name, delivered, "public event broadcast");
        delivered
    }
}
