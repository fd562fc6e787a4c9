//! ServerDefinition - catalog record for an installable MCP server

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Catalog description of an installable server.
///
/// Definitions arrive wholesale from the backend on every registry load and
/// are never mutated in place by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDefinition {
    /// Unique identifier (e.g., "com.anthropic.github")
    pub id: String,

    /// Display name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Optional short alias for tool prefixing (e.g., "gh")
    #[serde(default)]
    pub alias: Option<String>,

    /// Authentication configuration
    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Optional icon (emoji or URL)
    #[serde(default)]
    pub icon: Option<String>,

    /// Self-contained transport configuration (includes inputs!)
    pub transport: TransportConfig,

    /// Registry categorization
    #[serde(default)]
    pub categories: Vec<String>,

    /// Publisher info
    #[serde(default)]
    pub publisher: Option<PublisherInfo>,

    /// Where this server came from
    #[serde(default)]
    pub source: ServerSource,
}

impl ServerDefinition {
    /// Minimal definition with an empty stdio transport.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            alias: None,
            auth: None,
            icon: None,
            transport: TransportConfig::empty_stdio(),
            categories: Vec::new(),
            publisher: None,
            source: ServerSource::default(),
        }
    }

    pub fn requires_oauth(&self) -> bool {
        matches!(self.auth, Some(AuthConfig::Oauth))
    }

    /// Auth type discriminant, `none` when the definition omits auth.
    pub fn auth_type(&self) -> AuthType {
        self.auth.as_ref().map_or(AuthType::None, AuthConfig::auth_type)
    }

    /// Inputs declared by the transport
    pub fn inputs(&self) -> &[InputDefinition] {
        &self.transport.metadata().inputs
    }

    /// Inputs the user must fill in before the server can start
    pub fn required_inputs(&self) -> impl Iterator<Item = &InputDefinition> {
        self.inputs().iter().filter(|input| input.required)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum ServerSource {
    /// Loaded from a user-defined JSON file in the spaces directory
    UserSpace {
        space_id: String,
        file_path: PathBuf,
    },
    /// Loaded from the bundled registry.json
    #[default]
    Bundled,
    /// Loaded from a remote or custom registry (API, NPM, etc.)
    Registry { url: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Stdio,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
        #[serde(default)]
        metadata: TransportMetadata,
    },
    Http {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(default)]
        metadata: TransportMetadata,
    },
}

impl TransportConfig {
    /// Stdio transport with no command and no inputs (placeholder for unknown servers)
    pub fn empty_stdio() -> Self {
        Self::Stdio {
            command: String::new(),
            args: Vec::new(),
            env: HashMap::new(),
            metadata: TransportMetadata::default(),
        }
    }

    pub fn transport_type(&self) -> TransportType {
        match self {
            Self::Stdio { .. } => TransportType::Stdio,
            Self::Http { .. } => TransportType::Http,
        }
    }

    /// Get metadata reference for this transport
    pub fn metadata(&self) -> &TransportMetadata {
        match self {
            Self::Stdio { metadata, .. } | Self::Http { metadata, .. } => metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransportMetadata {
    /// Inputs required by this transport
    #[serde(default)]
    pub inputs: Vec<InputDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDefinition {
    pub id: String,
    pub label: String,
    #[serde(default = "default_input_type")]
    pub r#type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub secret: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub obtain_url: Option<String>,
    #[serde(default)]
    pub obtain_instructions: Option<String>,
}

impl InputDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            r#type: default_input_type(),
            required: false,
            secret: false,
            description: None,
            placeholder: None,
            obtain_url: None,
            obtain_instructions: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self.r#type = "password".to_string();
        self
    }
}

fn default_input_type() -> String {
    "text".to_string()
}

/// Authentication requirements, one variant per auth type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    None,
    ApiKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instructions: Option<String>,
    },
    OptionalApiKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instructions: Option<String>,
    },
    Oauth,
}

impl AuthConfig {
    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::None => AuthType::None,
            Self::ApiKey { .. } => AuthType::ApiKey,
            Self::OptionalApiKey { .. } => AuthType::OptionalApiKey,
            Self::Oauth => AuthType::Oauth,
        }
    }

    /// Credential instructions, only carried by the api-key variants
    pub fn instructions(&self) -> Option<&str> {
        match self {
            Self::ApiKey { instructions } | Self::OptionalApiKey { instructions } => {
                instructions.as_deref()
            }
            Self::None | Self::Oauth => None,
        }
    }
}

/// Auth discriminant without variant payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    None,
    ApiKey,
    OptionalApiKey,
    Oauth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherInfo {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub official: bool,
}
