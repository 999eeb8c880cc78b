//! Append-only output log for recorded deposits.
//!
//! The scanner writes through the [`DepositSink`] capability and never reads
//! back. A sink is keyed by a single handle (for [`CsvSink`], a file path):
//! the first append to a handle that does not exist yet creates it with a
//! header row, later appends add data rows only.
//!
//! # Example
//!
//! ```no_run
//! use deposit_scanner::sink::{CsvSink, DepositSink};
//!
//! # async fn example() -> deposit_scanner::error::ScannerResult<()> {
//! let mut sink = CsvSink::new("deposit_logs.csv");
//! let header_needed = !sink.exists().await?;
//! sink.append_rows(&[], header_needed).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::ScannerResult;
use crate::models::DepositEvent;

pub mod file;

pub use self::file::CsvSink;

/// Append-only tabular store for deposit rows.
#[async_trait]
pub trait DepositSink: Send + Sync {
    /// Whether the underlying store already exists.
    async fn exists(&self) -> ScannerResult<bool>;

    /// Append `rows` in [`COLUMNS`](crate::models::COLUMNS) order, writing the
    /// header line first when `write_header` is set.
    ///
    /// Either every row lands or an error is returned.
    async fn append_rows(&mut self, rows: &[DepositEvent], write_header: bool) -> ScannerResult<()>;

    /// Human-readable handle used in progress messages.
    fn describe(&self) -> String;
}
