//! Error types for the deposit scanner.
//!
//! This module provides a unified error type [`ScannerError`] covering every
//! failure a scan can hit, grouped by where it originates:
//! - [`ScannerError::ConfigError`]: unsupported chains and bad environment values
//! - [`ScannerError::RpcError`]: head-height and log queries against a node
//! - [`ScannerError::DecodingError`]: log entries the Deposit binding cannot decode
//! - [`ScannerError::SinkError`]: failures writing rows to the output log
//! - [`ScannerError::RangeError`]: a resolved range whose end precedes its start
//!
//! Only `RangeError` is recoverable by the caller: the scanner reports it as
//! an aborted [`ScanResult`](crate::models::ScanResult) instead of failing.
//!
//! # Example
//!
//! ```
//! use deposit_scanner::error::{ScannerError, ScannerResult};
//!
//! fn check_range(start: u64, end: u64) -> ScannerResult<()> {
//!     if end < start {
//!         return Err(ScannerError::range(start, end));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_range(200, 100).is_err());
//! ```

use std::fmt;

/// Result type alias using [`ScannerError`].
pub type ScannerResult<T> = Result<T, ScannerError>;

/// Boxed source error carried by most variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for the deposit scanner.
#[derive(Debug)]
pub enum ScannerError {
    /// Configuration or environment errors.
    ///
    /// Variants include:
    /// - Unsupported chain identifier
    /// - Chain without a configured endpoint
    /// - Malformed environment values or addresses
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// RPC provider or network errors.
    RpcError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Log entries that do not decode as a Deposit event, or that lack
    /// fields the node is expected to provide.
    DecodingError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Output log write failures.
    SinkError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// The resolved end block is below the resolved start block.
    RangeError {
        /// Resolved start block
        start: u64,
        /// Resolved (and clamped) end block
        end: u64,
    },
}

impl ScannerError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use deposit_scanner::error::ScannerError;
    ///
    /// let err = ScannerError::config("unsupported chain 'eth'", None);
    /// assert!(matches!(err, ScannerError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new RPC error.
    #[must_use]
    pub fn rpc(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::RpcError {
            message: message.into(),
            source,
        }
    }

    /// Create a new decoding error.
    #[must_use]
    pub fn decoding(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::DecodingError {
            message: message.into(),
            source,
        }
    }

    /// Create a new sink error.
    ///
    /// # Example
    ///
    /// ```
    /// use deposit_scanner::error::ScannerError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    /// let err = ScannerError::sink("failed to append rows", Some(Box::new(io)));
    /// assert!(matches!(err, ScannerError::SinkError { .. }));
    /// ```
    #[must_use]
    pub fn sink(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::SinkError {
            message: message.into(),
            source,
        }
    }

    /// Create a new range error.
    #[must_use]
    pub const fn range(start: u64, end: u64) -> Self {
        Self::RangeError { start, end }
    }
}

impl fmt::Display for ScannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::RpcError { message, .. } => write!(f, "RPC error: {message}"),
            Self::DecodingError { message, .. } => write!(f, "Decoding error: {message}"),
            Self::SinkError { message, .. } => write!(f, "Sink error: {message}"),
            Self::RangeError { start, end } => write!(
                f,
                "Range error: end_block < start_block (end_block = {end}, start_block = {start})"
            ),
        }
    }
}

impl std::error::Error for ScannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::RpcError { source, .. }
            | Self::DecodingError { source, .. }
            | Self::SinkError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            Self::RangeError { .. } => None,
        }
    }
}

/// Convert from `eyre::Report` to `ScannerError`.
///
/// Reports carry no category of their own, so they are classed as RPC errors.
impl From<eyre::Report> for ScannerError {
    fn from(err: eyre::Report) -> Self {
        Self::RpcError {
            message: format!("{err:#}"),
            source: None,
        }
    }
}
