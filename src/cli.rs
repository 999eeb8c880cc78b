//! Command-line interface for the deposit scanner.
//!
//! # Commands
//!
//! - `scan`: Record Deposit events from a block range to a CSV file
//! - `head`: Print the current head block of a chain
//!
//! # Example
//!
//! ```bash
//! # Scan the last blocks of BSC testnet into deposit_logs.csv
//! deposit-scanner scan bsc 45000000 latest 0x5FbDB2315678afecb367f032d93F642f64180aa3
//!
//! # Machine-readable summary into a custom file
//! deposit-scanner scan avax 100 200 0x5FbDB2315678afecb367f032d93F642f64180aa3 -o avax.csv --json
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use crate::chain::{BlockBound, Chain};
use crate::config::Config;
use crate::error::{ScannerError, ScannerResult};
use crate::models::{ScanOutcome, ScanRequest, ScanResult};
use crate::rpc::{check_connection, RpcEventSource};
use crate::scanner::RangeScanner;
use crate::sink::CsvSink;

/// Bridge Deposit event scanner
#[derive(Parser, Debug)]
#[command(name = "deposit-scanner")]
#[command(about = "Records bridge Deposit events from a block range to a CSV log", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a block range and append Deposit events to the output file
    Scan {
        /// Chain to scan (avax or bsc)
        chain: String,

        /// First block to scan, or "latest"
        start: String,

        /// Last block to scan, or "latest"; clamped to the chain head
        end: String,

        /// Address of the bridge contract emitting Deposit events
        contract: String,

        /// Output CSV file (default: DEPOSIT_LOG_FILE or deposit_logs.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the scan summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the current head block of a chain
    Head {
        /// Chain to query (avax or bsc)
        chain: String,
    },
}

/// Parse CLI arguments and execute the selected command.
///
/// # Errors
///
/// Returns an error if:
/// - An argument is invalid (unsupported chain, malformed block or address)
/// - Configuration loading fails
/// - An RPC query or an output write fails
pub async fn run() -> ScannerResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            chain,
            start,
            end,
            contract,
            output,
            json,
        } => {
            let request = parse_request(&chain, &start, &end, &contract)?;
            run_scan_command(request, output, json).await
        }
        Commands::Head { chain } => run_head_command(chain.parse()?).await,
    }
}

/// Validate the positional scan arguments.
fn parse_request(chain: &str, start: &str, end: &str, contract: &str) -> ScannerResult<ScanRequest> {
    let chain = Chain::from_str(chain)?;
    let start = BlockBound::from_str(start)?;
    let end = BlockBound::from_str(end)?;
    let contract = Address::from_str(contract.trim()).map_err(|e| {
        ScannerError::config(
            format!("contract must be a 20-byte hex address, got '{contract}'"),
            Some(Box::new(e)),
        )
    })?;

    Ok(ScanRequest::new(chain, start, end, contract))
}

/// Execute the scan command.
async fn run_scan_command(
    request: ScanRequest,
    output: Option<PathBuf>,
    json: bool,
) -> ScannerResult<()> {
    let config = Config::from_env()?;
    let endpoint = config.endpoint(request.chain)?;
    let source = RpcEventSource::connect(request.chain, &endpoint).await?;

    let scanner = RangeScanner::new()
        .with_policy(config.policy())
        .with_source(request.chain, Arc::new(source));

    let output = output.unwrap_or_else(|| config.output_file().clone());
    let mut sink = CsvSink::new(&output);

    info!(output = %output.display(), "Starting scan");
    let result = scanner.scan(&request, &mut sink).await?;

    if json {
        let summary = serde_json::to_string_pretty(&result).map_err(|e| {
            ScannerError::sink("failed to serialize scan summary", Some(Box::new(e)))
        })?;
        println!("{summary}");
    } else {
        print_summary(&result, &sink);
    }

    Ok(())
}

/// Execute the head command.
async fn run_head_command(chain: Chain) -> ScannerResult<()> {
    let config = Config::from_env()?;
    let source = RpcEventSource::connect(chain, &config.endpoint(chain)?).await?;
    let head = check_connection(source.provider()).await?;

    println!(
        "{} {} head: {}",
        "⛓".cyan(),
        chain.to_string().bold(),
        head.to_string().yellow()
    );

    Ok(())
}

/// Display a scan summary with colored formatting.
fn print_summary(result: &ScanResult, sink: &CsvSink) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    match result.outcome {
        ScanOutcome::Aborted { start, end } => {
            warn!(start, end, "Scan aborted");
            println!("{}", "Error end_block < start_block!".yellow().bold());
            println!("end_block = {end}");
            println!("start_block = {start}");
        }
        ScanOutcome::Completed { start, end, .. } => {
            println!(
                "{} {} {} blocks {}-{} | Deposits: {} | Rows written: {} → {}",
                "📥".cyan(),
                timestamp.to_string().dimmed(),
                result.chain.to_string().bold(),
                start.to_string().yellow(),
                end.to_string().yellow(),
                result.total_found.to_string().green().bold(),
                result.rows_written,
                sink.path().display().to_string().blue()
            );
        }
    }
}
