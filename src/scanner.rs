//! Block-range scanning for Deposit events.
//!
//! A scan runs through these phases:
//!
//! ```text
//! Unresolved ──► RangeValidated ──► Scanning ──► Flushing ──► Done
//!                      │                ▲            │
//!                      │                └────────────┘  (per-block strategy)
//!                      └──► Aborted  (end < start)
//! ```
//!
//! 1. **Resolve**: each `latest` bound is replaced by a fresh head query, then
//!    the end is clamped to the head returned by one more query.
//! 2. **Validate**: if the end precedes the start, the scan stops with an
//!    aborted [`ScanResult`] before any event query or flush.
//! 3. **Scan**: ranges narrower than [`ScanPolicy::wide_range_threshold`] are
//!    fetched with one query. Wider ranges are fetched one block at a time so
//!    that providers capping results per query still return everything.
//! 4. **Flush**: rows are buffered and appended to the sink. The per-block
//!    strategy flushes as soon as the buffer reaches
//!    [`ScanPolicy::flush_threshold`] rows, even in the middle of a block, so
//!    memory stays bounded no matter how wide the range is.
//!
//! Query and sink failures propagate as-is. Rows flushed before a failure stay
//! in the sink.
//!
//! # Example
//!
//! ```no_run
//! use deposit_scanner::chain::{BlockBound, Chain};
//! use deposit_scanner::config::Config;
//! use deposit_scanner::models::ScanRequest;
//! use deposit_scanner::scanner::RangeScanner;
//! use deposit_scanner::sink::CsvSink;
//! use alloy::primitives::address;
//!
//! # async fn example() -> deposit_scanner::error::ScannerResult<()> {
//! let config = Config::from_env()?;
//! let scanner = RangeScanner::from_config(&config).await?;
//! let mut sink = CsvSink::new(config.output_file());
//!
//! let request = ScanRequest::new(
//!     Chain::Bsc,
//!     1_000,
//!     BlockBound::Latest,
//!     address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
//! );
//! let result = scanner.scan(&request, &mut sink).await?;
//! println!("Found {} deposits", result.total_found);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::chain::{BlockBound, Chain};
use crate::config::Config;
use crate::error::{ScannerError, ScannerResult};
use crate::events::DepositLog;
use crate::models::{DepositEvent, ScanOutcome, ScanRequest, ScanResult, ScanStrategy};
use crate::rpc::RpcEventSource;
use crate::sink::DepositSink;

/// Range size (`end - start`) from which the per-block strategy is used.
pub const WIDE_RANGE_THRESHOLD: u64 = 30;

/// Buffered rows that trigger a flush during per-block scans.
pub const FLUSH_THRESHOLD: usize = 1000;

/// Query capability for one chain.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Current head block number.
    async fn current_head(&self) -> ScannerResult<u64>;

    /// Every Deposit emitted by `contract` in `[from_block, to_block]`.
    async fn query_deposits(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> ScannerResult<Vec<DepositLog>>;
}

/// Strategy and batching thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Ranges with `end - start` at or above this use one query per block.
    pub wide_range_threshold: u64,
    /// Rows buffered before a flush during per-block scans.
    pub flush_threshold: usize,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            wide_range_threshold: WIDE_RANGE_THRESHOLD,
            flush_threshold: FLUSH_THRESHOLD,
        }
    }
}

impl ScanPolicy {
    /// Strategy for the resolved range `[start, end]`.
    #[must_use]
    pub const fn strategy_for(&self, start: u64, end: u64) -> ScanStrategy {
        if end.saturating_sub(start) < self.wide_range_threshold {
            ScanStrategy::SingleQuery
        } else {
            ScanStrategy::PerBlock
        }
    }
}

/// Scans block ranges on the configured chains and records Deposit events.
#[derive(Clone, Default)]
pub struct RangeScanner {
    sources: BTreeMap<Chain, Arc<dyn EventSource>>,
    policy: ScanPolicy,
}

impl RangeScanner {
    /// Create a scanner with no chains configured and the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scanner with one RPC source per configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an endpoint setting is malformed, or
    /// an RPC error if an endpoint URL cannot be parsed.
    pub async fn from_config(config: &Config) -> ScannerResult<Self> {
        let mut scanner = Self::new().with_policy(config.policy());
        for chain in config.chains() {
            let endpoint = config.endpoint(chain)?;
            let source = RpcEventSource::connect(chain, &endpoint).await?;
            scanner = scanner.with_source(chain, Arc::new(source));
        }
        Ok(scanner)
    }

    /// Register the query capability for `chain`, replacing any previous one.
    #[must_use]
    pub fn with_source(mut self, chain: Chain, source: Arc<dyn EventSource>) -> Self {
        self.sources.insert(chain, source);
        self
    }

    /// Replace the strategy and batching thresholds.
    #[must_use]
    pub const fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current policy.
    #[must_use]
    pub const fn policy(&self) -> ScanPolicy {
        self.policy
    }

    /// Query capability for `chain`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no source is registered for `chain`.
    pub fn source(&self, chain: Chain) -> ScannerResult<&dyn EventSource> {
        self.sources
            .get(&chain)
            .map(|source| &**source)
            .ok_or_else(|| {
                ScannerError::config(format!("no RPC endpoint configured for chain '{chain}'"), None)
            })
    }

    /// Scan the requested range and append every Deposit found to `sink`.
    ///
    /// Returns the number of events observed. An inverted range is not an
    /// error: the result is marked aborted and nothing is queried or written.
    ///
    /// # Errors
    ///
    /// - Configuration error if the chain has no registered source
    /// - RPC or decoding errors from the query capability
    /// - Sink errors from appending rows
    #[instrument(skip(self, sink), fields(chain = %request.chain, contract = %request.contract))]
    pub async fn scan<S>(&self, request: &ScanRequest, sink: &mut S) -> ScannerResult<ScanResult>
    where
        S: DepositSink + ?Sized,
    {
        let source = self.source(request.chain)?;

        let (start, end) = resolve_range(source, request.start, request.end).await?;

        if end < start {
            let err = ScannerError::range(start, end);
            warn!(start_block = start, end_block = end, "{err}");
            return Ok(ScanResult::aborted(request.chain, start, end));
        }
        debug!(start, end, "Range validated");

        if start == end {
            info!("Scanning block {start} on {}", request.chain);
        } else {
            info!("Scanning blocks {start} - {end} on {}", request.chain);
        }

        let strategy = self.policy.strategy_for(start, end);
        let mut run = ScanRun::new(request.chain, sink);

        match strategy {
            ScanStrategy::SingleQuery => {
                let logs = run.query(source, request.contract, start, end).await?;
                run.extend(&logs);
                run.flush().await?;
            }
            ScanStrategy::PerBlock => {
                for block in start..=end {
                    let logs = run.query(source, request.contract, block, block).await?;
                    for log in &logs {
                        run.push(log);
                        if run.batch.len() >= self.policy.flush_threshold {
                            run.flush().await?;
                        }
                    }
                }
                run.flush().await?;
            }
        }

        info!("Done. Total Deposit events found: {}", run.total_found);

        Ok(ScanResult {
            chain: request.chain,
            total_found: run.total_found,
            rows_written: run.rows_written,
            flushes: run.flushes,
            event_queries: run.event_queries,
            outcome: ScanOutcome::Completed {
                start,
                end,
                strategy,
            },
        })
    }
}

/// Resolve symbolic bounds and clamp the end to the chain head.
///
/// Every `latest` bound costs one head query, and the clamp costs one more, so
/// the bounds may observe different heads on a moving chain.
async fn resolve_range(
    source: &dyn EventSource,
    start: BlockBound,
    end: BlockBound,
) -> ScannerResult<(u64, u64)> {
    let start = match start {
        BlockBound::Number(n) => n,
        BlockBound::Latest => source.current_head().await?,
    };
    let mut end = match end {
        BlockBound::Number(n) => n,
        BlockBound::Latest => source.current_head().await?,
    };

    let head = source.current_head().await?;
    if end > head {
        debug!(requested = end, head, "Clamping end block to chain head");
        end = head;
    }

    Ok((start, end))
}

/// Mutable state of one scan: the batch and the running counters.
struct ScanRun<'a, S: DepositSink + ?Sized> {
    chain: Chain,
    sink: &'a mut S,
    batch: Vec<DepositEvent>,
    total_found: usize,
    rows_written: usize,
    flushes: usize,
    event_queries: u64,
}

impl<'a, S: DepositSink + ?Sized> ScanRun<'a, S> {
    fn new(chain: Chain, sink: &'a mut S) -> Self {
        Self {
            chain,
            sink,
            batch: Vec::new(),
            total_found: 0,
            rows_written: 0,
            flushes: 0,
            event_queries: 0,
        }
    }

    async fn query(
        &mut self,
        source: &dyn EventSource,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> ScannerResult<Vec<DepositLog>> {
        self.event_queries += 1;
        let logs = source.query_deposits(contract, from_block, to_block).await?;
        self.total_found += logs.len();
        if !logs.is_empty() {
            debug!(from_block, to_block, found = logs.len(), "Deposit events found");
        }
        Ok(logs)
    }

    fn push(&mut self, log: &DepositLog) {
        self.batch.push(DepositEvent::from_log(self.chain, log));
    }

    fn extend(&mut self, logs: &[DepositLog]) {
        let chain = self.chain;
        self.batch
            .extend(logs.iter().map(|log| DepositEvent::from_log(chain, log)));
    }

    /// Append the batch to the sink, creating it with a header if needed.
    async fn flush(&mut self) -> ScannerResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let write_header = !self.sink.exists().await?;
        self.sink.append_rows(&self.batch, write_header).await?;

        let written = self.batch.len();
        self.rows_written += written;
        self.flushes += 1;
        self.batch.clear();

        info!("Wrote {written} row(s) to {}", self.sink.describe());

        Ok(())
    }
}
