//! User-facing notification sink
//!
//! Stores report mutation outcomes here instead of returning them to a view.
//! A desktop shell implements this with toasts; headless hosts use
//! [`TracingNotifier`].

use tracing::{info, warn};

/// Toast-style notifications.
///
/// **Object Safety**: takes `&str` so stores can hold `Arc<dyn Notifier>`.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// Logs notifications instead of displaying them
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(message, "[Notify] Success");
    }

    fn error(&self, message: &str) {
        warn!(message, "[Notify] Error");
    }
}
