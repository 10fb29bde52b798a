// Logging module - tracing subscriber setup for the command line
//
// Human-readable output goes to stderr so stdout stays clean for rendered
// contracts. File logging is optional and writes JSON lines through a
// non-blocking rolling appender.
//
// Precedence: RUST_LOG env var > config file > default "info"

use crate::config::{LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive applied when RUST_LOG is unset
pub fn default_filter(level: &str) -> String {
    format!("cola={level},cola_builder={level}")
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    let (file_layer, guard) = match file_writer(config) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn file_writer(
    config: &LoggingConfig,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if !config.file_enabled {
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&config.file_dir) {
        // Fall back to stderr only
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            config.file_dir, e
        );
        return None;
    }

    let appender = match config.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
        }
        LogRotation::Daily => tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix),
        LogRotation::Never => tracing_appender::rolling::never(&config.file_dir, &config.file_prefix),
    };

    Some(tracing_appender::non_blocking(appender))
}
