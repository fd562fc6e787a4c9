//! UI Events - payloads pushed from the backend to the desktop client
//!
//! The backend forwards its domain events to the client over named channels.
//! Each channel carries a JSON payload; this module defines the channel names,
//! the typed payloads, and the connection status vocabulary they share.
//!
//! # Delivery
//!
//! - **Fire-and-forget**: the backend never waits for the client
//! - **Unordered**: events may arrive out of order or duplicated
//! - **Flow-gated**: status events carry a monotonic `flow_id`; the client
//!   uses it to discard stale updates

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel names used by the backend event bridge
pub mod channels {
    /// Connection status transitions (`ServerStatusChangedPayload`)
    pub const SERVER_STATUS_CHANGED: &str = "server-status-changed";
    /// OAuth countdown ticks (`ServerAuthProgressPayload`)
    pub const SERVER_AUTH_PROGRESS: &str = "server-auth-progress";
    /// Newly discovered tools/prompts/resources (`ServerFeaturesUpdatedPayload`)
    pub const SERVER_FEATURES_UPDATED: &str = "server-features-updated";
    /// Install/uninstall/config lifecycle (`ServerChangedPayload`)
    pub const SERVER_CHANGED: &str = "server-changed";
}

// ============================================================================
// CONNECTION STATUS
// ============================================================================

/// Server connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Successfully connected and responding
    Connected,
    /// Not connected (idle state) - this is the default
    #[default]
    Disconnected,
    /// Connection failed with error
    Error,
    /// OAuth authentication required before connecting
    #[serde(rename = "oauth_required")]
    OAuthRequired,
    /// Attempting to connect
    Connecting,
    /// Refreshing features/connection
    Refreshing,
    /// In OAuth authentication flow (waiting for user)
    Authenticating,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
            Self::OAuthRequired => "oauth_required",
            Self::Connecting => "connecting",
            Self::Refreshing => "refreshing",
            Self::Authenticating => "authenticating",
        }
    }

    /// Check if the server is currently connected
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Refreshing)
    }

    /// Check if this is a terminal state (not transitioning)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Connected | Self::Disconnected | Self::Error | Self::OAuthRequired
        )
    }

    /// Check if authentication is needed
    pub fn needs_auth(&self) -> bool {
        matches!(self, Self::OAuthRequired | Self::Authenticating)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-server status record, as returned by `get_server_statuses`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatusResponse {
    pub server_id: String,
    pub status: ConnectionStatus,
    pub flow_id: u64,
    #[serde(default)]
    pub has_connected_before: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ServerStatusResponse {
    pub fn new(server_id: impl Into<String>, status: ConnectionStatus, flow_id: u64) -> Self {
        Self {
            server_id: server_id.into(),
            status,
            flow_id,
            has_connected_before: false,
            message: None,
        }
    }
}

// ============================================================================
// CHANNEL PAYLOADS
// ============================================================================

/// Payload of `server-status-changed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatusChangedPayload {
    pub space_id: Uuid,
    pub server_id: String,
    pub status: ConnectionStatus,
    /// Monotonic flow_id for race condition prevention
    pub flow_id: u64,
    /// Whether this server has ever connected successfully
    #[serde(default)]
    pub has_connected_before: bool,
    /// Error or status message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServerStatusChangedPayload {
    /// Status record equivalent of this event
    pub fn to_record(&self) -> ServerStatusResponse {
        ServerStatusResponse {
            server_id: self.server_id.clone(),
            status: self.status,
            flow_id: self.flow_id,
            has_connected_before: self.has_connected_before,
            message: self.message.clone(),
        }
    }
}

/// Payload of `server-auth-progress`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAuthProgressPayload {
    pub space_id: Uuid,
    pub server_id: String,
    /// Seconds remaining in auth timeout
    pub remaining_seconds: u64,
    /// Auth flow this tick belongs to
    pub flow_id: u64,
}

/// Payload of `server-features-updated`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerFeaturesUpdatedPayload {
    pub space_id: Uuid,
    pub server_id: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    /// Feature names that were added
    #[serde(default)]
    pub added: Vec<String>,
    /// Feature names that were removed
    #[serde(default)]
    pub removed: Vec<String>,
}

impl ServerFeaturesUpdatedPayload {
    /// Total number of features
    pub fn total_count(&self) -> usize {
        self.tools.len() + self.prompts.len() + self.resources.len()
    }
}

/// Lifecycle action carried by `server-changed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerChangeAction {
    Installed,
    Uninstalled,
    ConfigUpdated,
    Enabled,
    Disabled,
}

/// Payload of `server-changed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerChangedPayload {
    pub action: ServerChangeAction,
    pub space_id: Uuid,
    pub server_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

// ============================================================================
// RAW EVENT
// ============================================================================

/// A raw push event: channel name plus untyped JSON payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEvent {
    pub channel: String,
    pub payload: serde_json::Value,
}

impl UiEvent {
    pub fn new(channel: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }

    /// Build an event from a typed payload
    pub fn typed<T: Serialize>(
        channel: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(channel, serde_json::to_value(payload)?))
    }

    pub fn status_changed(payload: &ServerStatusChangedPayload) -> Self {
        Self::new(
            channels::SERVER_STATUS_CHANGED,
            serde_json::json!({
                "space_id": payload.space_id,
                "server_id": payload.server_id,
                "status": payload.status.as_str(),
                "flow_id": payload.flow_id,
                "has_connected_before": payload.has_connected_before,
                "message": payload.message,
            }),
        )
    }

    pub fn auth_progress(payload: &ServerAuthProgressPayload) -> Self {
        Self::new(
            channels::SERVER_AUTH_PROGRESS,
            serde_json::json!({
                "space_id": payload.space_id,
                "server_id": payload.server_id,
                "remaining_seconds": payload.remaining_seconds,
                "flow_id": payload.flow_id,
            }),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
