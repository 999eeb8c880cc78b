//! Supported chains and block bounds.
//!
//! [`Chain`] is the closed set of networks the scanner knows about. Parsing any
//! other identifier yields a configuration error rather than falling back to a
//! default endpoint.
//!
//! [`BlockBound`] is one end of a requested range: either a concrete block
//! number or the symbolic `latest`, resolved against the chain head when the
//! scan starts.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ScannerError;

/// EVM-compatible test networks the scanner can read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Avalanche C-Chain testnet (Fuji).
    Avax,
    /// BNB Smart Chain testnet.
    Bsc,
}

impl Chain {
    /// Every supported chain, in a stable order.
    pub const ALL: [Self; 2] = [Self::Avax, Self::Bsc];

    /// Identifier used on the command line and in the `chain` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avax => "avax",
            Self::Bsc => "bsc",
        }
    }

    /// Public RPC endpoint used when no override is configured.
    #[must_use]
    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Avax => "https://api.avax-test.network/ext/bc/C/rpc",
            Self::Bsc => "https://data-seed-prebsc-1-s1.binance.org:8545/",
        }
    }

    /// Environment variable prefix for this chain's settings (`AVAX`, `BSC`).
    #[must_use]
    pub const fn env_prefix(self) -> &'static str {
        match self {
            Self::Avax => "AVAX",
            Self::Bsc => "BSC",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avax" => Ok(Self::Avax),
            "bsc" => Ok(Self::Bsc),
            other => Err(ScannerError::config(
                format!("unsupported chain '{other}' (expected 'avax' or 'bsc')"),
                None,
            )),
        }
    }
}

/// One end of a requested block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockBound {
    /// A concrete block number.
    Number(u64),
    /// The chain head at the moment the bound is resolved.
    Latest,
}

impl From<u64> for BlockBound {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for BlockBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Latest => f.write_str("latest"),
        }
    }
}

impl FromStr for BlockBound {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        s.parse::<u64>().map(Self::Number).map_err(|e| {
            ScannerError::config(
                format!("block bound must be a non-negative integer or 'latest', got '{s}'"),
                Some(Box::new(e)),
            )
        })
    }
}
