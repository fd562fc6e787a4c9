//! MCP Server Registry
//!
//! Declarative UI configuration shipped with the registry bundle. Filters and
//! sort options are data: the client interprets them generically through
//! field paths and operators instead of per-field code.

mod ui_config;

pub use ui_config::*;
