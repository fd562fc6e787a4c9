//! Typed subscription registry over raw push events

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use mcpmux_core::UiEvent;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::ClientError;

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

struct Listener {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl HubInner {
    fn remove(&self, channel: &str, id: u64) -> bool {
        let mut listeners = self.listeners.write();
        let Some(channel_listeners) = listeners.get_mut(channel) else {
            return false;
        };
        let before = channel_listeners.len();
        channel_listeners.retain(|l| l.id != id);
        let removed = channel_listeners.len() != before;
        if channel_listeners.is_empty() {
            listeners.remove(channel);
        }
        removed
    }
}

/// Fan-out of push events to typed listeners.
///
/// Dispatch is synchronous: every listener for the channel runs to
/// completion on the dispatching task before `dispatch` returns. Handlers
/// may subscribe or unsubscribe from inside a callback.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `channel`, decoding each payload into `T`.
    ///
    /// Payloads that fail to decode are logged and skipped for this
    /// listener only. The listener lives until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription immediately unsubscribes the handler"]
    pub fn listen<T, F>(&self, channel: &str, handler: F) -> Subscription
    where
        T: DeserializeOwned,
        F: Fn(T) + Send + Sync + 'static,
    {
        let channel_name = channel.to_string();
        let decode_channel = channel_name.clone();
        let handler: Handler = Arc::new(move |payload: &Value| match T::deserialize(payload) {
            Ok(typed) => handler(typed),
            Err(source) => {
                let err = ClientError::Payload {
                    channel: decode_channel.clone(),
                    source,
                };
                warn!(error = %err, "[EventHub] Dropping malformed payload");
            }
        });

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .entry(channel_name.clone())
            .or_default()
            .push(Listener { id, handler });

        trace!(channel = %channel_name, id, "[EventHub] Listener registered");

        Subscription {
            hub: Arc::downgrade(&self.inner),
            channel: channel_name,
            id,
        }
    }

    /// Deliver an event to every listener on its channel.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &UiEvent) -> usize {
        let handlers: Vec<Handler> = self
            .inner
            .listeners
            .read()
            .get(&event.channel)
            .map(|ls| ls.iter().map(|l| Arc::clone(&l.handler)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(&event.payload);
        }

        trace!(
            channel = %event.channel,
            listeners = handlers.len(),
            "[EventHub] Dispatched event"
        );
        handlers.len()
    }

    /// Number of live listeners on a channel
    pub fn listener_count(&self, channel: &str) -> usize {
        self.inner
            .listeners
            .read()
            .get(channel)
            .map_or(0, Vec::len)
    }

    /// Number of live listeners across all channels
    pub fn total_listeners(&self) -> usize {
        self.inner.listeners.read().values().map(Vec::len).sum()
    }
}

/// Handle for one registered listener; unsubscribes on drop.
pub struct Subscription {
    hub: Weak<HubInner>,
    channel: String,
    id: u64,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Unsubscribe now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if hub.remove(&self.channel, self.id) {
                trace!(channel = %self.channel, id = self.id, "[EventHub] Listener removed");
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("id", &self.id)
            .finish()
    }
}
