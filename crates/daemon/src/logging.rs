//! Logging setup
//!
//! Console output is pretty by default, JSON with `CUSF_LOG_FORMAT=json`.
//! Everything is also written to a daily-rolling file under the logs dir.

use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "cusf-launcher.log";
const DEFAULT_FILTER: &str = "cusf=info,tower_http=info";

/// Must be kept alive for the file writer to flush
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

pub fn init_logging(log_dir: &Path) -> io::Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let json = std::env::var("CUSF_LOG_FORMAT")
        .map(|f| f == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer().pretty()))
        .with(
            fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false),
        )
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
