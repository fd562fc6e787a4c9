//! Tracing bootstrap for the client
//!
//! - Console: colored, compact format
//! - File: daily rotation under `<data_dir>/logs`

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ClientConfig, DEFAULT_LOG_FILTER, LOG_PREFIX};
use crate::error::ClientResult;

/// Build the level filter: `RUST_LOG` wins, then the configured directives.
pub fn build_env_filter(config: &ClientConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.log_filter)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    })
}

/// Install the global subscriber.
///
/// The returned guard must be kept alive for as long as file logging is
/// wanted; dropping it flushes and stops the background writer.
pub fn init_tracing(config: &ClientConfig) -> ClientResult<WorkerGuard> {
    std::fs::create_dir_all(&config.logs_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(&config.logs_dir)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true);

    // A subscriber may already be installed (tests, embedding shell)
    if tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("[Logging] Global subscriber already set, keeping existing one");
    }

    Ok(guard)
}
