//! Client-side error type

use thiserror::Error;

/// Result alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// An action was invoked before `attach` bound the store to a space
    #[error("store is not attached to a space")]
    NotAttached,

    /// A backend command was rejected
    #[error("{command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },

    /// A push payload did not match the channel's schema
    #[error("invalid payload on {channel}: {source}")]
    Payload {
        channel: String,
        #[source]
        source: serde_json::Error,
    },

    /// Settings storage rejected a read or write
    #[error("settings error for {key}: {message}")]
    Settings { key: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Wrap a backend failure with the command that produced it
    pub fn command(command: &'static str, err: &anyhow::Error) -> Self {
        Self::Command {
            command,
            message: format!("{err:#}"),
        }
    }
}
