use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// SSE-specific sub-state carved out from [`AppState`](super::AppState).
pub struct SseState {
    console: SseHub,
    projection: SseHub,
}

impl SseState {
    /// Build the SSE sub-tree with one hub per display surface.
    pub fn new(capacity: usize) -> Self {
        Self {
            console: SseHub::new(capacity),
            projection: SseHub::new(capacity),
        }
    }

    /// Hub feeding the moderator console (SSE and WebSocket).
    pub fn console(&self) -> &SseHub {
        &self.console
    }

    /// Hub feeding the projector display.
    pub fn projection(&self) -> &SseHub {
        &self.projection
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
