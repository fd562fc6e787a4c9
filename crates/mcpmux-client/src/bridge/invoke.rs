//! Command surface over an IPC `invoke` transport
//!
//! The desktop shell exposes backend commands by name with JSON arguments.
//! Argument keys are camelCase, the shell maps them onto the snake_case
//! command parameters.

use std::collections::HashMap;

use anyhow::Context as _;
use async_trait::async_trait;
use mcpmux_core::{HomeConfig, InstalledServer, ServerDefinition, ServerStatusResponse, UiConfig};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::commands::{CommandResult, ConnectionCommands, RegistryCommands, ServerInputs};

/// Backend command names
pub mod names {
    pub const GET_SERVER_STATUSES: &str = "get_server_statuses";
    pub const ENABLE_SERVER: &str = "enable_server_v2";
    pub const DISABLE_SERVER: &str = "disable_server_v2";
    pub const START_AUTH: &str = "start_auth_v2";
    pub const CANCEL_AUTH: &str = "cancel_auth_v2";
    pub const RETRY_CONNECTION: &str = "retry_connection";
    pub const DISCOVER_SERVERS: &str = "discover_servers";
    pub const GET_REGISTRY_UI_CONFIG: &str = "get_registry_ui_config";
    pub const GET_REGISTRY_HOME_CONFIG: &str = "get_registry_home_config";
    pub const IS_REGISTRY_OFFLINE: &str = "is_registry_offline";
    pub const LIST_INSTALLED_SERVERS: &str = "list_installed_servers";
    pub const INSTALL_SERVER: &str = "install_server";
    pub const UNINSTALL_SERVER: &str = "uninstall_server";
    pub const SET_SERVER_ENABLED: &str = "set_server_enabled";
    pub const SAVE_SERVER_INPUTS: &str = "save_server_inputs";
}

/// Raw IPC transport
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> anyhow::Result<Value>;
}

/// Both command traits implemented over an [`Invoke`] transport
pub struct InvokeBackend<I> {
    transport: I,
}

impl<I: Invoke> InvokeBackend<I> {
    pub fn new(transport: I) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &I {
        &self.transport
    }

    async fn call<T: DeserializeOwned>(&self, command: &str, args: Value) -> CommandResult<T> {
        debug!(command, "[Bridge] Invoking backend command");
        let response = self
            .transport
            .invoke(command, args)
            .await
            .with_context(|| format!("{command} rejected"))?;
        serde_json::from_value(response)
            .with_context(|| format!("{command} returned an unexpected response"))
    }

    /// For commands whose response body carries nothing
    async fn call_unit(&self, command: &str, args: Value) -> CommandResult<()> {
        debug!(command, "[Bridge] Invoking backend command");
        self.transport
            .invoke(command, args)
            .await
            .with_context(|| format!("{command} rejected"))?;
        Ok(())
    }

    async fn server_command(
        &self,
        command: &str,
        space_id: Uuid,
        server_id: &str,
    ) -> CommandResult<()> {
        self.call_unit(command, json!({ "spaceId": space_id, "serverId": server_id }))
            .await
    }
}

#[async_trait]
impl<I: Invoke> RegistryCommands for InvokeBackend<I> {
    async fn discover_servers(&self) -> CommandResult<Vec<ServerDefinition>> {
        self.call(names::DISCOVER_SERVERS, json!({})).await
    }

    async fn get_registry_ui_config(&self) -> CommandResult<UiConfig> {
        self.call(names::GET_REGISTRY_UI_CONFIG, json!({})).await
    }

    async fn get_registry_home_config(&self) -> CommandResult<Option<HomeConfig>> {
        self.call(names::GET_REGISTRY_HOME_CONFIG, json!({})).await
    }

    async fn is_registry_offline(&self) -> CommandResult<bool> {
        self.call(names::IS_REGISTRY_OFFLINE, json!({})).await
    }

    async fn list_installed_servers(&self, space_id: Uuid) -> CommandResult<Vec<InstalledServer>> {
        self.call(names::LIST_INSTALLED_SERVERS, json!({ "spaceId": space_id }))
            .await
    }

    async fn install_server(
        &self,
        server_id: &str,
        space_id: Uuid,
    ) -> CommandResult<InstalledServer> {
        self.call(
            names::INSTALL_SERVER,
            json!({ "id": server_id, "spaceId": space_id }),
        )
        .await
    }

    async fn uninstall_server(&self, server_id: &str, space_id: Uuid) -> CommandResult<()> {
        self.call_unit(
            names::UNINSTALL_SERVER,
            json!({ "id": server_id, "spaceId": space_id }),
        )
        .await
    }

    async fn set_server_enabled(
        &self,
        server_id: &str,
        enabled: bool,
        space_id: Uuid,
    ) -> CommandResult<()> {
        self.call_unit(
            names::SET_SERVER_ENABLED,
            json!({ "id": server_id, "enabled": enabled, "spaceId": space_id }),
        )
        .await
    }

    async fn save_server_inputs(
        &self,
        server_id: &str,
        space_id: Uuid,
        inputs: ServerInputs,
    ) -> CommandResult<InstalledServer> {
        self.call(
            names::SAVE_SERVER_INPUTS,
            json!({
                "id": server_id,
                "inputValues": inputs.input_values,
                "spaceId": space_id,
                "envOverrides": inputs.env_overrides,
                "argsAppend": inputs.args_append,
                "extraHeaders": inputs.extra_headers,
            }),
        )
        .await
    }
}

#[async_trait]
impl<I: Invoke> ConnectionCommands for InvokeBackend<I> {
    async fn get_server_statuses(
        &self,
        space_id: Uuid,
    ) -> CommandResult<HashMap<String, ServerStatusResponse>> {
        self.call(names::GET_SERVER_STATUSES, json!({ "spaceId": space_id }))
            .await
    }

    async fn enable_server(&self, space_id: Uuid, server_id: &str) -> CommandResult<()> {
        self.server_command(names::ENABLE_SERVER, space_id, server_id)
            .await
    }

    async fn disable_server(&self, space_id: Uuid, server_id: &str) -> CommandResult<()> {
        self.server_command(names::DISABLE_SERVER, space_id, server_id)
            .await
    }

    async fn start_auth(&self, space_id: Uuid, server_id: &str) -> CommandResult<()> {
        self.server_command(names::START_AUTH, space_id, server_id)
            .await
    }

    async fn cancel_auth(&self, space_id: Uuid, server_id: &str) -> CommandResult<()> {
        self.server_command(names::CANCEL_AUTH, space_id, server_id)
            .await
    }

    async fn retry_connection(&self, space_id: Uuid, server_id: &str) -> CommandResult<()> {
        self.server_command(names::RETRY_CONNECTION, space_id, server_id)
            .await
    }
}
