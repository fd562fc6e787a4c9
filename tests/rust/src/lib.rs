//! Shared test utilities and fixtures for McpMux client integration tests.

pub use mcpmux_core::{
    ConnectionStatus, InstalledServer, ServerDefinition, ServerStatusResponse, UiConfig,
};

pub use mocks::{MockBackend, RecordedCall, RecordingNotifier};

/// Event testing utilities
pub mod events {
    use std::time::Duration;

    use mcpmux_core::{
        ConnectionStatus, ServerAuthProgressPayload, ServerFeaturesUpdatedPayload,
        ServerStatusChangedPayload, UiEvent,
    };
    use uuid::Uuid;

    /// Status-changed payload with `has_connected_before = false`
    pub fn status_payload(
        space_id: Uuid,
        server_id: &str,
        status: ConnectionStatus,
        flow_id: u64,
    ) -> ServerStatusChangedPayload {
        ServerStatusChangedPayload {
            space_id,
            server_id: server_id.to_string(),
            status,
            flow_id,
            has_connected_before: false,
            message: None,
        }
    }

    pub fn status_event(
        space_id: Uuid,
        server_id: &str,
        status: ConnectionStatus,
        flow_id: u64,
    ) -> UiEvent {
        UiEvent::status_changed(&status_payload(space_id, server_id, status, flow_id))
    }

    pub fn auth_progress_event(
        space_id: Uuid,
        server_id: &str,
        remaining_seconds: u64,
        flow_id: u64,
    ) -> UiEvent {
        UiEvent::auth_progress(&ServerAuthProgressPayload {
            space_id,
            server_id: server_id.to_string(),
            remaining_seconds,
            flow_id,
        })
    }

    pub fn features_event(space_id: Uuid, server_id: &str, tools: &[&str]) -> UiEvent {
        let payload = ServerFeaturesUpdatedPayload {
            space_id,
            server_id: server_id.to_string(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
            added: tools.iter().map(|t| t.to_string()).collect(),
            ..ServerFeaturesUpdatedPayload::default()
        };
        UiEvent::typed(mcpmux_core::channels::SERVER_FEATURES_UPDATED, &payload)
            .expect("features payload serializes")
    }

    /// Yield until `condition` holds or `timeout` elapses
    pub async fn wait_until<F>(timeout: Duration, condition: F) -> bool
    where
        F: Fn() -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        while !condition() {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }
}

/// Test fixture utilities
pub mod fixtures {
    use mcpmux_core::{
        FilterDefinition, FilterMatch, FilterOperator, FilterOption, NullsPlacement,
        ServerDefinition, SortOption, SortRule, UiConfig,
    };
    use serde_json::{json, Value};

    /// Stdio definition via JSON deserialization (fills defaults for all fields)
    pub fn definition(id: &str, name: &str) -> ServerDefinition {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "description": format!("{name} test server"),
            "transport": {
                "type": "stdio",
                "command": "echo"
            }
        }))
        .expect("valid definition")
    }

    /// Definition with `auth: none` and a required input
    pub fn definition_with_required_input(id: &str, name: &str, input_id: &str) -> ServerDefinition {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "auth": { "type": "none" },
            "transport": {
                "type": "stdio",
                "command": "npx",
                "args": ["-y", "@modelcontextprotocol/server-github"],
                "metadata": {
                    "inputs": [
                        { "id": input_id, "label": input_id, "required": true, "secret": true }
                    ]
                }
            }
        }))
        .expect("valid definition")
    }

    /// Remote definition with `auth: oauth`
    pub fn oauth_definition(id: &str, name: &str) -> ServerDefinition {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "auth": { "type": "oauth" },
            "categories": ["productivity"],
            "publisher": { "name": name, "official": true },
            "transport": {
                "type": "http",
                "url": format!("https://{id}.example.com/mcp")
            }
        }))
        .expect("valid definition")
    }

    fn option(id: &str, field: &str, operator: &str, value: Value) -> FilterOption {
        FilterOption {
            id: id.to_string(),
            label: id.to_string(),
            icon: None,
            match_rule: Some(FilterMatch {
                field: field.to_string(),
                operator: FilterOperator::from(operator.to_string()),
                value,
            }),
        }
    }

    fn filter(id: &str, options: Vec<FilterOption>) -> FilterDefinition {
        FilterDefinition {
            id: id.to_string(),
            label: id.to_string(),
            filter_type: "single".to_string(),
            options,
        }
    }

    /// Filters and sorts shaped like the registry bundle's UI section
    pub fn ui_config() -> UiConfig {
        UiConfig {
            filters: vec![
                filter(
                    "auth",
                    vec![
                        option("all", "auth.type", "eq", Value::Null),
                        option("oauth", "auth.type", "eq", json!("oauth")),
                        option("none", "auth.type", "eq", json!("none")),
                    ],
                ),
                filter(
                    "category",
                    vec![option("productivity", "categories", "contains", json!("productivity"))],
                ),
                filter(
                    "transport",
                    vec![option("remote", "transport.type", "in", json!(["http"]))],
                ),
            ],
            sort_options: vec![
                SortOption {
                    id: "name_asc".to_string(),
                    label: "Name (A-Z)".to_string(),
                    rules: vec![SortRule::asc("name")],
                },
                SortOption {
                    id: "official_first".to_string(),
                    label: "Official first".to_string(),
                    rules: vec![
                        SortRule::asc("publisher.official").nulls(NullsPlacement::Last),
                        SortRule::asc("name"),
                    ],
                },
                SortOption {
                    id: "installed_first".to_string(),
                    label: "Installed first".to_string(),
                    rules: vec![SortRule::asc("is_installed")],
                },
            ],
            default_sort: "name_asc".to_string(),
            items_per_page: 2,
        }
    }
}
