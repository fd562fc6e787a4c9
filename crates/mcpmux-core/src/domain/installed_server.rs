//! InstalledServer - per-space installation record as reported by the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use super::ServerDefinition;

/// Tracks how a server was installed (drives uninstall semantics in the backend)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallationSource {
    /// Installed from Registry via UI
    #[default]
    Registry,
    /// Auto-synced from user space JSON file
    UserConfig {
        /// Path to the JSON file this server came from
        file_path: PathBuf,
    },
    /// Manually entered via "Add Server" UI (not from any file)
    ManualEntry,
}

/// Installation of a server into a space.
///
/// The backend owns this record; the client only reads it and sends
/// mutation commands. `cached_definition` is the JSON snapshot taken at
/// install time, used to render the server when the catalog is unreachable.
///
/// Connection status is NOT stored here - it is runtime-only state pushed
/// through status events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledServer {
    /// Unique installation ID
    pub id: Uuid,

    /// Space this server is installed in
    pub space_id: String,

    /// Server ID (e.g., "com.cloudflare/bindings-mcp" or "my-custom-server")
    pub server_id: String,

    /// Server display name (cached from definition for offline display)
    #[serde(default)]
    pub server_name: Option<String>,

    /// Cached server definition (JSON) for offline operation
    #[serde(default)]
    pub cached_definition: Option<String>,

    /// Input values keyed by input id (may contain secrets)
    #[serde(default)]
    pub input_values: HashMap<String, String>,

    /// Whether this installation is enabled (auto-connects on gateway start)
    #[serde(default)]
    pub enabled: bool,

    /// Environment variable overrides beyond inputs
    #[serde(default)]
    pub env_overrides: HashMap<String, String>,

    /// Extra arguments to append to command
    #[serde(default)]
    pub args_append: Vec<String>,

    /// Extra HTTP headers for HTTP transports
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,

    /// Whether OAuth authentication has been completed
    #[serde(default)]
    pub oauth_connected: bool,

    /// How this server was installed
    #[serde(default)]
    pub source: InstallationSource,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl InstalledServer {
    /// Create a new installed server (disabled, no inputs)
    pub fn new(space_id: impl Into<String>, server_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            space_id: space_id.into(),
            server_id: server_id.into(),
            server_name: None,
            cached_definition: None,
            input_values: HashMap::new(),
            enabled: false,
            env_overrides: HashMap::new(),
            args_append: Vec::new(),
            extra_headers: HashMap::new(),
            oauth_connected: false,
            source: InstallationSource::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a cached definition snapshot
    pub fn with_definition(mut self, definition: &ServerDefinition) -> Self {
        self.server_name = Some(definition.name.clone());
        self.cached_definition = serde_json::to_string(definition).ok();
        self
    }

    /// Attach a raw cached definition string (may be malformed)
    pub fn with_cached_json(mut self, json: impl Into<String>) -> Self {
        self.cached_definition = Some(json.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Get the cached server definition, `None` if absent or malformed
    pub fn get_definition(&self) -> Option<ServerDefinition> {
        self.try_definition().ok().flatten()
    }

    /// Parse the cached definition, surfacing parse errors to the caller
    pub fn try_definition(&self) -> Result<Option<ServerDefinition>, serde_json::Error> {
        self.cached_definition
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }

    /// Display name (cached name, else last segment of server_id)
    pub fn display_name(&self) -> &str {
        self.server_name.as_deref().unwrap_or_else(|| {
            self.server_id
                .split('/')
                .next_back()
                .unwrap_or(&self.server_id)
        })
    }

    pub fn with_inputs(mut self, inputs: HashMap<String, String>) -> Self {
        self.input_values = inputs;
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.input_values.insert(key.into(), value.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_oauth_connected(mut self, connected: bool) -> Self {
        self.oauth_connected = connected;
        self
    }

    pub fn with_source(mut self, source: InstallationSource) -> Self {
        self.source = source;
        self
    }

    /// Whether the input has a non-empty stored value
    pub fn has_input(&self, input_id: &str) -> bool {
        self.input_values
            .get(input_id)
            .is_some_and(|value| !value.is_empty())
    }

    pub fn is_from_user_config(&self) -> bool {
        matches!(self.source, InstallationSource::UserConfig { .. })
    }
}
