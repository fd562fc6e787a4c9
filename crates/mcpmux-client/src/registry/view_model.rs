//! Registry view models: catalog definitions joined with installation state

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use mcpmux_core::{
    AuthType, ConnectionStatus, InstalledServer, ServerDefinition, ServerStatusResponse,
    TransportConfig,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Description shown for installed servers whose definition is unavailable
pub const DEFINITION_NOT_CACHED: &str = "(Server definition not cached)";

/// One row of the registry/servers display list.
///
/// Serializes flat (definition fields at the top level) so filter and sort
/// paths like `auth.type` or `is_installed` resolve against it directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerViewModel {
    #[serde(flatten)]
    pub definition: ServerDefinition,
    pub is_installed: bool,
    pub enabled: bool,
    pub oauth_connected: bool,
    /// Stored input values; never part of the JSON projection
    #[serde(skip_serializing)]
    pub input_values: HashMap<String, String>,
    pub env_overrides: HashMap<String, String>,
    pub args_append: Vec<String>,
    pub extra_headers: HashMap<String, String>,
    pub missing_required_inputs: bool,
    /// Initial guess until runtime status is known
    pub connection_status: ConnectionStatus,
    pub installed_at: Option<DateTime<Utc>>,
    /// Built from a cached snapshot or placeholder rather than the live catalog
    pub offline: bool,
}

impl ServerViewModel {
    fn build(
        definition: ServerDefinition,
        state: Option<&InstalledServer>,
        offline: bool,
    ) -> Self {
        let missing_required_inputs = definition
            .required_inputs()
            .any(|input| !state.is_some_and(|s| s.has_input(&input.id)));
        let enabled = state.is_some_and(|s| s.enabled);

        Self {
            is_installed: state.is_some(),
            enabled,
            oauth_connected: state.is_some_and(|s| s.oauth_connected),
            input_values: state.map(|s| s.input_values.clone()).unwrap_or_default(),
            env_overrides: state.map(|s| s.env_overrides.clone()).unwrap_or_default(),
            args_append: state.map(|s| s.args_append.clone()).unwrap_or_default(),
            extra_headers: state.map(|s| s.extra_headers.clone()).unwrap_or_default(),
            missing_required_inputs,
            connection_status: if enabled {
                ConnectionStatus::Connecting
            } else {
                ConnectionStatus::Disconnected
            },
            installed_at: state.map(|s| s.created_at),
            offline,
            definition,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn auth_type(&self) -> AuthType {
        self.definition.auth_type()
    }
}

/// Join catalog definitions with installation records.
///
/// Output order: definitions in catalog order, then installed servers that
/// have no definition (in installed order). Exactly one view model per id:
/// the first definition for an id wins, and the last installed record for
/// an id wins.
pub fn merge(definitions: &[ServerDefinition], states: &[InstalledServer]) -> Vec<ServerViewModel> {
    let state_by_id: HashMap<&str, &InstalledServer> = states
        .iter()
        .map(|s| (s.server_id.as_str(), s))
        .collect();

    let mut seen: HashSet<&str> = HashSet::with_capacity(definitions.len() + states.len());
    let mut merged = Vec::with_capacity(definitions.len() + states.len());

    for definition in definitions {
        if !seen.insert(definition.id.as_str()) {
            debug!(server_id = %definition.id, "[Registry] Duplicate definition skipped");
            continue;
        }
        let state = state_by_id.get(definition.id.as_str()).copied();
        merged.push(ServerViewModel::build(definition.clone(), state, false));
    }

    for state in states {
        if !seen.insert(state.server_id.as_str()) {
            continue;
        }
        let latest = state_by_id
            .get(state.server_id.as_str())
            .copied()
            .unwrap_or(state);
        merged.push(offline_view_model(latest));
    }

    merged
}

/// View model for an installed server missing from the catalog
fn offline_view_model(state: &InstalledServer) -> ServerViewModel {
    let definition = match state.try_definition() {
        Ok(Some(mut cached)) => {
            // The installation record is authoritative for identity
            cached.id = state.server_id.clone();
            cached
        }
        Ok(None) => placeholder_definition(state),
        Err(e) => {
            warn!(
                server_id = %state.server_id,
                error = %e,
                "[Registry] Cached definition is malformed, using placeholder"
            );
            placeholder_definition(state)
        }
    };

    ServerViewModel::build(definition, Some(state), true)
}

fn placeholder_definition(state: &InstalledServer) -> ServerDefinition {
    let mut definition = ServerDefinition::new(&state.server_id, state.display_name());
    definition.description = Some(DEFINITION_NOT_CACHED.to_string());
    definition.transport = TransportConfig::empty_stdio();
    definition
}

/// Replace the initial status guess with runtime status where known
pub fn apply_runtime_statuses(
    view_models: &mut [ServerViewModel],
    statuses: &HashMap<String, ServerStatusResponse>,
) {
    for vm in view_models {
        if let Some(record) = statuses.get(&vm.definition.id) {
            vm.connection_status = record.status;
        }
    }
}
