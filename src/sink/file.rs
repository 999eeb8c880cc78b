//! CSV file sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

use super::DepositSink;
use crate::error::{ScannerError, ScannerResult};
use crate::models::{DepositEvent, COLUMNS};

/// Appends deposit rows to a comma-separated file.
///
/// Each append is encoded in memory first and written on a file opened in
/// append mode, then synced. If the write fails part-way (a full disk, say),
/// the file is truncated back to its length before the append. Only a failed
/// truncation can leave a partial batch behind, and that is logged.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Create a sink writing to `path`. Nothing is touched until the first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Encode rows (and optionally the header) as CSV bytes.
fn encode_rows(rows: &[DepositEvent], write_header: bool) -> ScannerResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::with_capacity(rows.len() * 192));

    let to_sink_error =
        |e: csv::Error| ScannerError::sink("failed to encode CSV row", Some(Box::new(e)));

    if write_header {
        writer.write_record(COLUMNS).map_err(to_sink_error)?;
    }
    for row in rows {
        writer.write_record(row.to_record()).map_err(to_sink_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| ScannerError::sink(format!("failed to finish CSV buffer: {}", e.error()), None))
}

/// Storage that can be cut back to an earlier length.
#[async_trait]
trait Truncate {
    async fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
}

#[async_trait]
impl Truncate for tokio::fs::File {
    async fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len).await
    }
}

/// Write `bytes` to `target`, restoring `original_len` if the write fails.
async fn append_or_truncate<W>(target: &mut W, bytes: &[u8], original_len: u64) -> std::io::Result<()>
where
    W: AsyncWrite + Truncate + Unpin + Send,
{
    let written = async {
        target.write_all(bytes).await?;
        target.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(truncate_err) = target.truncate_to(original_len).await {
            warn!(error = %truncate_err, original_len, "Failed to remove partial CSV append");
        }
        return Err(e);
    }

    Ok(())
}

#[async_trait]
impl DepositSink for CsvSink {
    async fn exists(&self) -> ScannerResult<bool> {
        tokio::fs::try_exists(&self.path).await.map_err(|e| {
            ScannerError::sink(
                format!("failed to check {}", self.path.display()),
                Some(Box::new(e)),
            )
        })
    }

    #[instrument(skip(self, rows), fields(path = %self.path.display(), rows = rows.len()))]
    async fn append_rows(&mut self, rows: &[DepositEvent], write_header: bool) -> ScannerResult<()> {
        let bytes = encode_rows(rows, write_header)?;

        let io_error = |e: std::io::Error| {
            ScannerError::sink(
                format!("failed to append to {}", self.path.display()),
                Some(Box::new(e)),
            )
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_error)?;
        let original_len = file.metadata().await.map_err(io_error)?.len();
        append_or_truncate(&mut file, &bytes, original_len)
            .await
            .map_err(io_error)?;
        file.sync_data().await.map_err(io_error)?;

        debug!(bytes = bytes.len(), write_header, "Appended CSV rows");

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
