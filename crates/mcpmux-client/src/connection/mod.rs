//! Connection state
//!
//! - [`store`]: event-driven per-space status records and connection actions
//! - [`action`]: which control a server row shows for its current status

pub mod action;
pub mod store;

pub use action::{action_for, connect_label, derive_action, format_auth_countdown, ServerAction};
pub use store::{ConnectionState, ConnectionStore};
