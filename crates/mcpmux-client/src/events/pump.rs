//! Forwarding from the push-event bus into the hub

use mcpmux_core::EventReceiver;
use tokio::task::JoinHandle;
use tracing::info;

use super::EventHub;

/// Spawn a task that drains `receiver` into `hub` until the bus closes.
///
/// Aborting the returned handle stops forwarding; listeners registered on
/// the hub are unaffected.
pub fn spawn_event_pump(hub: EventHub, mut receiver: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("[EventHub] Event pump started");

        while let Some(event) = receiver.recv().await {
            hub.dispatch(&event);
        }

        info!("[EventHub] Event pump stopped");
    })
}
