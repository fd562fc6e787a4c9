//! Which primary control a server row shows

use mcpmux_core::{AuthConfig, ConnectionStatus};
use serde::Serialize;

use crate::registry::ServerViewModel;

/// Primary affordance for a server, derived from its flags and runtime
/// status. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerAction {
    /// Disabled; offer to enable
    Enable,
    /// Enabled but a required input has no value
    Configure,
    Connecting,
    /// OAuth window open; show the countdown and a cancel control
    Authenticating,
    /// OAuth server waiting for the user to connect
    AuthRequired,
    /// OAuth server connected; offer disconnect
    Running,
    /// Last attempt failed; offer retry
    Error,
    /// Non-OAuth server; the backend manages the connection itself
    ConnectedAuto,
}

impl ServerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Configure => "configure",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::AuthRequired => "auth_required",
            Self::Running => "running",
            Self::Error => "error",
            Self::ConnectedAuto => "connected_auto",
        }
    }
}

impl std::fmt::Display for ServerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disabled wins over everything, then missing configuration, then the
/// runtime status.
pub fn derive_action(
    enabled: bool,
    missing_required_inputs: bool,
    auth: Option<&AuthConfig>,
    status: ConnectionStatus,
) -> ServerAction {
    if !enabled {
        return ServerAction::Enable;
    }
    if missing_required_inputs {
        return ServerAction::Configure;
    }

    let oauth = matches!(auth, Some(AuthConfig::Oauth));
    match status {
        ConnectionStatus::Connecting => ServerAction::Connecting,
        ConnectionStatus::Authenticating => ServerAction::Authenticating,
        ConnectionStatus::OAuthRequired => ServerAction::AuthRequired,
        ConnectionStatus::Error => ServerAction::Error,
        ConnectionStatus::Connected | ConnectionStatus::Refreshing if oauth => ServerAction::Running,
        ConnectionStatus::Disconnected if oauth => ServerAction::AuthRequired,
        ConnectionStatus::Connected | ConnectionStatus::Refreshing | ConnectionStatus::Disconnected => {
            ServerAction::ConnectedAuto
        }
    }
}

/// Action for a view model; `runtime` overrides the view model's initial
/// status guess when known.
pub fn action_for(vm: &ServerViewModel, runtime: Option<ConnectionStatus>) -> ServerAction {
    derive_action(
        vm.enabled,
        vm.missing_required_inputs,
        vm.definition.auth.as_ref(),
        runtime.unwrap_or(vm.connection_status),
    )
}

pub fn connect_label(has_connected_before: bool) -> &'static str {
    if has_connected_before {
        "Reconnect"
    } else {
        "Connect"
    }
}

/// `Authenticating… (2m 5s remaining)`
pub fn format_auth_countdown(remaining_seconds: u64) -> String {
    format!(
        "Authenticating… ({}m {}s remaining)",
        remaining_seconds / 60,
        remaining_seconds % 60
    )
}
