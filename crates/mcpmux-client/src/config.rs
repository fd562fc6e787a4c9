//! Client configuration
//!
//! Resolved once at startup from the environment (with `.env` support for
//! development) and handed to the logging bootstrap and the stores.

use std::path::PathBuf;

use mcpmux_core::event_bus::DEFAULT_CAPACITY;

/// Application identifier, matches the desktop bundle identifier
pub const APP_IDENTIFIER: &str = "com.mcpmux.desktop";

/// Prefix for rotated log files (mcpmux-client.2026-01-22.log)
pub const LOG_PREFIX: &str = "mcpmux-client";

/// File name of the persisted UI settings inside the data dir
pub const SETTINGS_FILE: &str = "client-settings.json";

pub mod env {
    pub const DATA_DIR: &str = "MCPMUX_DATA_DIR";
    pub const LOG: &str = "MCPMUX_LOG";
    pub const EVENT_CAPACITY: &str = "MCPMUX_EVENT_CAPACITY";
}

/// Default filter directives when neither `RUST_LOG` nor `MCPMUX_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "info,mcpmux_client=debug,mcpmux_core=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// App local data directory
    pub data_dir: PathBuf,
    /// Directory for rotated log files
    pub logs_dir: PathBuf,
    /// `EnvFilter` directives
    pub log_filter: String,
    /// Capacity of the push-event bus
    pub event_capacity: usize,
    /// JSON file holding persisted UI settings
    pub settings_file: PathBuf,
}

impl ClientConfig {
    /// Build a config rooted at `data_dir` with default settings
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            logs_dir: data_dir.join("logs"),
            settings_file: data_dir.join(SETTINGS_FILE),
            data_dir,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            event_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Load from process environment, reading `.env` files first
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup(env::DATA_DIR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let mut config = Self::with_data_dir(data_dir);

        if let Some(filter) = lookup(env::LOG).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        if let Some(raw) = lookup(env::EVENT_CAPACITY) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => config.event_capacity = capacity,
                _ => tracing::warn!(
                    value = %raw,
                    "[Config] Ignoring invalid {}", env::EVENT_CAPACITY
                ),
            }
        }

        config
    }
}

/// Same location the desktop shell uses (local, not roaming)
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_IDENTIFIER)
}
