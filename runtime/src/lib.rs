//! Process-level setup shared by the community hub binaries.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`). When
//! `COMMUNITY_HUB_LOG_DIR` is set, the same events are also written to a
//! daily-rotated file in that directory.

use std::path::PathBuf;

/// Directory for daily log files; unset disables file logging.
pub const LOG_DIR_ENV: &str = "COMMUNITY_HUB_LOG_DIR";
/// File name prefix of the daily log files.
pub const LOG_FILE_PREFIX: &str = "community-hub.log";

/// Keeps the file writer flushing; drop it only when the process exits.
#[cfg(not(target_arch = "wasm32"))]
pub type LogGuard = tracing_appender::non_blocking::WorkerGuard;

/// Directory for file logs, if configured.
pub fn log_dir_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    lookup(LOG_DIR_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Install the global subscriber. Fails if one is already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_tracing(default_level: &str) -> anyhow::Result<Option<LogGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_dir = log_dir_from(|key| std::env::var(key).ok());
    let (file_layer, guard) = match &log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::debug!("writing logs to {}", dir.display());
    }
    Ok(guard)
}
