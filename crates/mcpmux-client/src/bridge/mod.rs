//! Backend command bridge
//!
//! `RegistryCommands` and `ConnectionCommands` are the seams the stores
//! depend on; `InvokeBackend` implements them over the shell's IPC invoke.

mod commands;
mod invoke;

pub use commands::{CommandResult, ConnectionCommands, RegistryCommands, ServerInputs};
pub use invoke::{names, Invoke, InvokeBackend};
