//! A [`Logger`] backed by `tracing`, and the subscriber setup a binary
//! built on this crate uses to make those events visible.

use backup_machines_core::Logger;

use crate::config::LogFormat;

/// Forwards every call to the matching `tracing` macro at the call site's
/// target, `backup_machines`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "backup_machines", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "backup_machines", "{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "backup_machines", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "backup_machines", "{message}");
    }

    fn critical(&self, message: &str) {
        tracing::error!(target: "backup_machines", critical = true, "{message}");
    }
}

/// Installs a global `tracing` subscriber reading its filter from `level`
/// (an `EnvFilter` directive string, e.g. `"info"` or `"backup_machines=debug"`),
/// falling back to the `RUST_LOG` environment variable when set, and
/// rendering events in `format`.
///
/// Returns an error if a subscriber is already installed; callers should
/// call this once, near the start of `main`.
pub fn init(level: &str, format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}
