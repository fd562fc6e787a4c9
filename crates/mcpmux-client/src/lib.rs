//! McpMux Client
//!
//! State engine behind the desktop UI:
//! - Registry view models joined from catalog definitions and installations
//! - Search/filter/sort driven by the registry's UI configuration
//! - Event-driven, flow-gated connection state per space
//! - Persisted application preferences

pub mod app_state;
pub mod bridge;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod logging;
pub mod notify;
pub mod registry;

pub use app_state::{
    AppState, AppStateStore, JsonFileSettingsRepository, Page, PersistedAppState,
    SettingsRepository, Theme,
};
pub use bridge::{
    CommandResult, ConnectionCommands, Invoke, InvokeBackend, RegistryCommands, ServerInputs,
};
pub use config::ClientConfig;
pub use connection::{
    action_for, connect_label, derive_action, format_auth_countdown, ConnectionState,
    ConnectionStore, ServerAction,
};
pub use error::{ClientError, ClientResult};
pub use events::{spawn_event_pump, EventHub, Subscription};
pub use logging::init_tracing;
pub use notify::{Notifier, TracingNotifier};
pub use registry::{
    apply_filters_and_sort, apply_runtime_statuses, merge, paginate, ActiveFilters,
    FieldAccessor, RegistryState, RegistryStore, ServerViewModel,
};
