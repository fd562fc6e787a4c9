//! Event Bus - push channel from the backend bridge to the client
//!
//! The backend bridge emits raw `UiEvent`s (channel name + JSON payload).
//! Every subscriber gets its own copy; the client's typed subscription layer
//! is one such subscriber.
//!
//! ```text
//! ┌──────────────────────┐   UiEvent    ┌──────────────┐   typed    ┌───────────────────┐
//! │ Backend event bridge │ ───────────▶ │   EventBus   │ ─────────▶ │ Client EventHub   │
//! └──────────────────────┘  (broadcast) └──────────────┘  payloads  │ (stores, pages)   │
//!                                                                   └───────────────────┘
//! ```
//!
//! Delivery is best effort: a slow receiver that lags skips the oldest
//! events and keeps going.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::UiEvent;

/// Default channel capacity for the event bus
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast hub for raw UI events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<UiEvent>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new event bus with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Get a sender for emitting events
    pub fn sender(&self) -> EventSender {
        EventSender::new(self.sender.clone())
    }

    /// Subscribe to receive events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe())
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheaply cloneable handle used by the bridge to emit events
#[derive(Clone)]
pub struct EventSender {
    sender: broadcast::Sender<UiEvent>,
}

impl EventSender {
    fn new(sender: broadcast::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    /// Emit an event, returning how many receivers got it (0 is not an error)
    pub fn emit(&self, event: UiEvent) -> usize {
        let channel = event.channel.clone();
        match self.sender.send(event) {
            Ok(count) => {
                debug!(channel = %channel, receivers = count, "[EventBus] Emitted event");
                count
            }
            Err(_) => {
                debug!(channel = %channel, "[EventBus] No receivers for event");
                0
            }
        }
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

/// Receiving end of the bus
pub struct EventReceiver {
    receiver: broadcast::Receiver<UiEvent>,
}

impl EventReceiver {
    fn new(receiver: broadcast::Receiver<UiEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event; `None` once the bus is closed.
    ///
    /// Lag is logged and skipped.
    pub async fn recv(&mut self) -> Option<UiEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        skipped_events = skipped,
                        "[EventBus] Receiver lagged, skipped {} events", skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("[EventBus] Channel closed");
                    return None;
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Option<UiEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped_events = skipped, "[EventBus] Receiver lagged on try_recv");
                self.receiver.try_recv().ok()
            }
            Err(_) => None,
        }
    }
}

/// Shared event bus for application-wide use
pub type SharedEventBus = Arc<EventBus>;

/// Create a shared event bus
pub fn create_shared_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}

// ============================================================================
// TESTS
// ============================================================================
