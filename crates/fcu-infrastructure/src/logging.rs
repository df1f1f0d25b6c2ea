//! Tracing subscriber setup for the fcu binaries.

use fcu_core::config::LoggingConfig;
use fcu_core::{FcuError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "fcu-client.log";

/// Keeps the file writer flushing. Hold it until the process exits.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// `RUST_LOG` when set and valid, otherwise the configured level.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Installs the global subscriber: stderr always, plus a daily-rolling file
/// when `config.directory` is set.
///
/// # Errors
///
/// Fails when the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| FcuError::internal(format!("Failed to install logger: {}", e)))?;

    if let Some(directory) = &config.directory {
        tracing::info!("[Logging] Writing logs to {}", directory.display());
    }

    Ok(LogGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        let filter = build_filter("[[not a directive");
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_configured_level_is_used() {
        if std::env::var_os("RUST_LOG").is_none() {
            let filter = build_filter("fcu_application=debug");
            assert_eq!(filter.to_string(), "fcu_application=debug");
        }
    }
}
