//! # Deposit Scanner
//!
//! Scans a block range on an EVM chain for a bridge contract's `Deposit`
//! events and appends them to an append-only CSV log, using
//! [Alloy](https://github.com/alloy-rs/alloy) for RPC and ABI decoding.
//!
//! ## Features
//!
//! - **Range resolution**: `latest` bounds and clamping to the chain head
//! - **Adaptive retrieval**: one log query for narrow ranges, one per block for wide ones
//! - **Bounded memory**: rows are flushed every 1000 events during per-block scans
//! - **Lossless rows**: 256-bit amounts written in base 10, checksummed addresses
//! - **Mockable seams**: [`scanner::EventSource`] and [`sink::DepositSink`] traits
//!
//! ## Architecture
//!
//! 1. **Config Layer** ([`config`]) - Environment loading, chain → endpoint map
//! 2. **RPC Layer** ([`rpc`]) - Providers and the RPC-backed event source
//! 3. **Events Layer** ([`events`]) - `sol!` Deposit binding and decoding
//! 4. **Scanner Layer** ([`scanner`]) - Range resolution, strategy, batching
//! 5. **Sink Layer** ([`sink`]) - CSV output
//!
//! ## Using as a Library
//!
//! ```rust,no_run
//! use deposit_scanner::{
//!     chain::{BlockBound, Chain},
//!     config::Config,
//!     models::ScanRequest,
//!     scanner::RangeScanner,
//!     sink::CsvSink,
//! };
//! use alloy::primitives::address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let scanner = RangeScanner::from_config(&config).await?;
//!     let mut sink = CsvSink::new("deposit_logs.csv");
//!
//!     let request = ScanRequest::new(
//!         Chain::Avax,
//!         BlockBound::Number(35_000_000),
//!         BlockBound::Latest,
//!         address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
//!     );
//!     let result = scanner.scan(&request, &mut sink).await?;
//!     println!("{} deposits recorded", result.rows_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`error::ScannerResult<T>`](error::ScannerResult).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod observability;
pub mod rpc;
pub mod scanner;
pub mod sink;
