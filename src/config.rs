//! Configuration management for the deposit scanner.
//!
//! Configuration is read from environment variables (and a `.env` file, if
//! present) using the `dotenvy` crate. Every value has a default, so a bare
//! environment yields a working configuration pointing at the public testnet
//! endpoints.
//!
//! Endpoint settings are checked when a chain's endpoint is requested, so a
//! malformed override for one chain does not block scans of the other.
//!
//! ## Environment Variables
//!
//! - `AVAX_RPC_URL`: Avalanche C-Chain testnet endpoint
//! - `BSC_RPC_URL`: BNB Smart Chain testnet endpoint
//! - `AVAX_POA` / `BSC_POA`: Whether the chain uses proof-of-authority headers (default: true)
//! - `WIDE_RANGE_THRESHOLD`: Range size at which scanning switches to per-block queries (default: 30)
//! - `FLUSH_THRESHOLD`: Rows buffered before a flush during per-block scans (default: 1000)
//! - `DEPOSIT_LOG_FILE`: Output CSV path (default: `deposit_logs.csv`)
//!
//! ## Example
//!
//! ```no_run
//! use deposit_scanner::chain::Chain;
//! use deposit_scanner::config::Config;
//! use deposit_scanner::error::ScannerResult;
//!
//! # fn main() -> ScannerResult<()> {
//! let config = Config::from_env()?;
//! println!("BSC endpoint: {}", config.endpoint(Chain::Bsc)?.rpc_url());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use crate::chain::Chain;
use crate::error::{ScannerError, ScannerResult};
use crate::scanner::ScanPolicy;

/// Default output file for recorded deposits.
pub const DEFAULT_OUTPUT_FILE: &str = "deposit_logs.csv";

/// How to reach one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    rpc_url: String,
    proof_of_authority: bool,
}

impl EndpointConfig {
    /// Create an endpoint descriptor.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>, proof_of_authority: bool) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            proof_of_authority,
        }
    }

    /// HTTP(S) JSON-RPC URL.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Whether block headers carry proof-of-authority extra data and need a
    /// header-tolerant network type.
    #[must_use]
    pub const fn proof_of_authority(&self) -> bool {
        self.proof_of_authority
    }
}

/// Endpoint settings for one chain as read, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EndpointSettings {
    rpc_url: String,
    proof_of_authority: String,
}

impl EndpointSettings {
    fn validate(&self, chain: Chain) -> ScannerResult<EndpointConfig> {
        let prefix = chain.env_prefix();

        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(ScannerError::config(
                format!("{prefix}_RPC_URL must be an http(s) URL, got: {}", self.rpc_url),
                None,
            ));
        }

        let proof_of_authority = self.proof_of_authority.parse::<bool>().map_err(|e| {
            ScannerError::config(
                format!("{prefix}_POA must be 'true' or 'false'"),
                Some(Box::new(e)),
            )
        })?;

        Ok(EndpointConfig::new(self.rpc_url.clone(), proof_of_authority))
    }
}

impl From<EndpointConfig> for EndpointSettings {
    fn from(endpoint: EndpointConfig) -> Self {
        Self {
            rpc_url: endpoint.rpc_url,
            proof_of_authority: endpoint.proof_of_authority.to_string(),
        }
    }
}

/// Runtime configuration for the scanner.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chain identifier to endpoint settings, validated on lookup
    endpoints: BTreeMap<Chain, EndpointSettings>,

    /// Strategy and batching thresholds
    policy: ScanPolicy,

    /// Where recorded deposits are appended
    output_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a threshold is not a valid number, or
    /// `FLUSH_THRESHOLD` is zero. Endpoint values are checked by
    /// [`Config::endpoint`].
    pub fn from_env() -> ScannerResult<Self> {
        // Load .env file if present (ignore error if file doesn't exist)
        dotenvy::dotenv().ok();

        let mut endpoints = BTreeMap::new();
        for chain in Chain::ALL {
            let prefix = chain.env_prefix();
            let settings = EndpointSettings {
                rpc_url: env::var(format!("{prefix}_RPC_URL"))
                    .unwrap_or_else(|_| chain.default_rpc_url().to_string()),
                proof_of_authority: env::var(format!("{prefix}_POA"))
                    .unwrap_or_else(|_| "true".to_string()),
            };
            endpoints.insert(chain, settings);
        }

        let defaults = ScanPolicy::default();

        let wide_range_threshold = env::var("WIDE_RANGE_THRESHOLD")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| {
                ScannerError::config(
                    "WIDE_RANGE_THRESHOLD must be a valid number",
                    Some(Box::new(e)),
                )
            })?
            .unwrap_or(defaults.wide_range_threshold);

        let flush_threshold = env::var("FLUSH_THRESHOLD")
            .ok()
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|e| {
                ScannerError::config("FLUSH_THRESHOLD must be a valid number", Some(Box::new(e)))
            })?
            .unwrap_or(defaults.flush_threshold);

        if flush_threshold == 0 {
            return Err(ScannerError::config(
                "FLUSH_THRESHOLD must be greater than zero",
                None,
            ));
        }

        let output_file = env::var("DEPOSIT_LOG_FILE")
            .unwrap_or_else(|_| DEFAULT_OUTPUT_FILE.to_string())
            .into();

        Ok(Self {
            endpoints,
            policy: ScanPolicy {
                wide_range_threshold,
                flush_threshold,
            },
            output_file,
        })
    }

    /// Build a configuration from explicit parts.
    #[must_use]
    pub fn new(
        endpoints: BTreeMap<Chain, EndpointConfig>,
        policy: ScanPolicy,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            endpoints: endpoints
                .into_iter()
                .map(|(chain, endpoint)| (chain, endpoint.into()))
                .collect(),
            policy,
            output_file: output_file.into(),
        }
    }

    /// Validated endpoint descriptor for `chain`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - No endpoint is configured for `chain`
    /// - Its RPC URL does not start with `http://` or `https://`
    /// - Its `*_POA` value is not `true` or `false`
    pub fn endpoint(&self, chain: Chain) -> ScannerResult<EndpointConfig> {
        self.endpoints
            .get(&chain)
            .ok_or_else(|| {
                ScannerError::config(format!("no RPC endpoint configured for chain '{chain}'"), None)
            })?
            .validate(chain)
    }

    /// Chains with an endpoint entry, in a stable order.
    pub fn chains(&self) -> impl Iterator<Item = Chain> + '_ {
        self.endpoints.keys().copied()
    }

    /// Strategy and batching thresholds.
    #[must_use]
    pub const fn policy(&self) -> ScanPolicy {
        self.policy
    }

    /// Default output file path.
    #[must_use]
    pub const fn output_file(&self) -> &PathBuf {
        &self.output_file
    }
}
