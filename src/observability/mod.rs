//! Structured logging setup.
//!
//! Logging goes through `tracing`. The subscriber built here writes to the
//! console (pretty or JSON) and, optionally, to a daily-rotated JSON file.
//!
//! # Environment Configuration
//!
//! ```bash
//! # Set log level for all modules
//! RUST_LOG=debug deposit-scanner scan bsc 100 latest 0x...
//!
//! # Per-block progress from the scanner, quiet dependencies
//! RUST_LOG=deposit_scanner=debug,warn deposit-scanner scan ...
//!
//! # JSON output for log shipping
//! LOG_JSON=true deposit-scanner scan ...
//!
//! # Also write logs to ./logs/scanner.log.YYYY-MM-DD
//! LOG_FILE=./logs/scanner.log deposit-scanner scan ...
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_FILTER: &str = "deposit_scanner=info,warn";

/// Initialize the global tracing subscriber.
///
/// # Arguments
///
/// * `log_level` - Filter directive used when `RUST_LOG` is unset (e.g. `"debug"`).
/// * `log_file` - Optional file path; enables a daily-rotated JSON log.
/// * `json_output` - JSON console output instead of the pretty format.
///
/// # Returns
///
/// The file writer's guard when `log_file` is set. Buffered file output is
/// flushed when the guard is dropped, so keep it alive until exit.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = if let Ok(filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(filter)
    } else if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    };

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let (file_layer, guard) = if let Some(ref path) = log_file {
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(directory)?;

        let appender = tracing_appender::rolling::daily(
            directory,
            path.file_name().unwrap_or_else(|| OsStr::new("scanner.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized"
    );

    Ok(guard)
}

/// Route logs to the test harness. Safe to call from every test.
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
