//! Event subscription layer
//!
//! Thin typed wrapper over the backend push channel: subscribe to a channel,
//! receive decoded payloads, unsubscribe automatically when the
//! [`Subscription`] handle is dropped.

mod hub;
mod pump;

pub use hub::{EventHub, Subscription};
pub use mcpmux_core::channels;
pub use pump::spawn_event_pump;
