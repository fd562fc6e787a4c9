//! Domain types shared by the backend bridge and the client
//!
//! - Catalog records (ServerDefinition and its transport/auth/input parts)
//! - Installation records (InstalledServer)
//! - Connection status and UI push-event payloads

mod event;
mod installed_server;
mod server;

pub use event::{
    channels, ConnectionStatus, ServerAuthProgressPayload, ServerChangeAction,
    ServerChangedPayload, ServerFeaturesUpdatedPayload, ServerStatusChangedPayload,
    ServerStatusResponse, UiEvent,
};
pub use installed_server::{InstallationSource, InstalledServer};
pub use server::*;
