//! # McpMux Core Library
//!
//! Domain types shared between the McpMux backend bridge and the desktop
//! client state engine.
//!
//! ## Modules
//!
//! - `domain` - Catalog definitions, installations, connection status, UI event payloads
//! - `registry` - Registry UI configuration (filters, sort options, home config)
//! - `event_bus` - In-process push-event channel carrying raw UI events

pub mod domain;
pub mod event_bus;
pub mod registry;

// Re-export commonly used types
pub use domain::*;
pub use registry::*;

pub use event_bus::{create_shared_event_bus, EventBus, EventReceiver, EventSender, SharedEventBus};
