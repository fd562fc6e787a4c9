//! Backend command surface
//!
//! Every command is request/acknowledge: mutations return once the backend
//! accepted them, and the resulting state arrives later as a push event.

use std::collections::HashMap;

use async_trait::async_trait;
use mcpmux_core::{HomeConfig, InstalledServer, ServerDefinition, ServerStatusResponse, UiConfig};
use uuid::Uuid;

/// Result type for backend commands
pub type CommandResult<T> = anyhow::Result<T>;

/// Configuration saved from the server config dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerInputs {
    pub input_values: HashMap<String, String>,
    pub env_overrides: Option<HashMap<String, String>>,
    pub args_append: Option<Vec<String>>,
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ServerInputs {
    pub fn new(input_values: HashMap<String, String>) -> Self {
        Self {
            input_values,
            ..Self::default()
        }
    }
}

/// Catalog and installation commands
#[async_trait]
pub trait RegistryCommands: Send + Sync {
    /// All catalog definitions (registry + user space files)
    async fn discover_servers(&self) -> CommandResult<Vec<ServerDefinition>>;

    /// Filter/sort configuration
    async fn get_registry_ui_config(&self) -> CommandResult<UiConfig>;

    /// Featured servers for the discover home page
    async fn get_registry_home_config(&self) -> CommandResult<Option<HomeConfig>>;

    /// Whether the backend is serving the catalog from its disk cache
    async fn is_registry_offline(&self) -> CommandResult<bool>;

    /// Installation records for a space
    async fn list_installed_servers(&self, space_id: Uuid) -> CommandResult<Vec<InstalledServer>>;

    async fn install_server(&self, server_id: &str, space_id: Uuid)
        -> CommandResult<InstalledServer>;

    async fn uninstall_server(&self, server_id: &str, space_id: Uuid) -> CommandResult<()>;

    async fn set_server_enabled(
        &self,
        server_id: &str,
        enabled: bool,
        space_id: Uuid,
    ) -> CommandResult<()>;

    async fn save_server_inputs(
        &self,
        server_id: &str,
        space_id: Uuid,
        inputs: ServerInputs,
    ) -> CommandResult<InstalledServer>;
}

/// Connection lifecycle commands
#[async_trait]
pub trait ConnectionCommands: Send + Sync {
    /// Current status snapshot for every server known in the space
    async fn get_server_statuses(
        &self,
        space_id: Uuid,
    ) -> CommandResult<HashMap<String, ServerStatusResponse>>;

    /// Mark enabled and start a connection attempt
    async fn enable_server(&self, space_id: Uuid, server_id: &str) -> CommandResult<()>;

    /// Disconnect and mark disabled
    async fn disable_server(&self, space_id: Uuid, server_id: &str) -> CommandResult<()>;

    /// Start (or restart) the OAuth flow; may open a browser window
    async fn start_auth(&self, space_id: Uuid, server_id: &str) -> CommandResult<()>;

    /// Abort an in-flight OAuth flow (advisory)
    async fn cancel_auth(&self, space_id: Uuid, server_id: &str) -> CommandResult<()>;

    /// Reconnect with stored credentials
    async fn retry_connection(&self, space_id: Uuid, server_id: &str) -> CommandResult<()>;
}
