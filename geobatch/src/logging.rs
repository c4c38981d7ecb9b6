//! Tracing subscriber setup.
//!
//! Logs go to stderr so they do not interleave with command output on
//! stdout. An optional log file receives the same events through a
//! non-blocking writer; keep the returned [`LogGuard`] alive until exit so
//! buffered lines are flushed.
//!
//! `RUST_LOG` takes precedence over the verbosity level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Keeps the log file writer alive.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Default filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "geobatch=info,geobatch_cli=info,warn",
        2 => "geobatch=debug,geobatch_cli=debug,info",
        _ => "trace",
    }
}

fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Installs the global subscriber.
///
/// Fails if a global subscriber is already set or the log file cannot be
/// opened.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<LogGuard, std::io::Error> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter(verbosity));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter(verbosity.max(1)));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(LogGuard { _file: guard })
}
