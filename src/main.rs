//! CLI entry point for the deposit scanner.
//!
//! ```text
//! main.rs   runtime + tracing setup
//!    ↓
//! cli.rs    argument parsing, output formatting
//!    ↓
//! config → rpc → scanner → sink
//! ```

use deposit_scanner::{cli, observability};
use tracing::error;

#[tokio::main]
async fn main() {
    // RUST_LOG: filter directives (default: deposit_scanner=info,warn)
    // LOG_JSON: JSON console output ("true" or "false")
    // LOG_FILE: additional daily-rotated JSON log file
    let log_level = std::env::var("RUST_LOG").ok();
    let log_file = std::env::var("LOG_FILE").ok().map(std::path::PathBuf::from);
    let json_output = std::env::var("LOG_JSON")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let _log_guard = match observability::init_tracing(log_level, log_file, json_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run().await {
        error!(error = %e, "Application error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
