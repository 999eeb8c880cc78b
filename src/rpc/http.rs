//! HTTP provider construction and the two RPC calls the scanner needs.
//!
//! Each chain gets one provider, built once from its [`EndpointConfig`].
//! Proof-of-authority chains (both supported testnets) put validator data in
//! the header `extraData` field and use non-standard header layouts, so they
//! are served through Alloy's [`AnyNetwork`], which accepts unknown header
//! fields. Standard chains use the default Ethereum network type.
//!
//! ## Example
//!
//! ```no_run
//! use deposit_scanner::config::EndpointConfig;
//! use deposit_scanner::rpc::{create_provider, get_latest_block};
//! use deposit_scanner::error::ScannerResult;
//!
//! # async fn example() -> ScannerResult<()> {
//! let endpoint = EndpointConfig::new("https://data-seed-prebsc-1-s1.binance.org:8545/", true);
//! let provider = create_provider(&endpoint).await?;
//! let latest_block = get_latest_block(&provider).await?;
//! println!("Latest block: {}", latest_block);
//! # Ok(())
//! # }
//! ```

use alloy::network::AnyNetwork;
use alloy::providers::{Provider as AlloyProvider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{Filter, Log};
use alloy::transports::http::{Client, Http};
use tracing::{debug, info, instrument, warn};

use crate::config::EndpointConfig;
use crate::error::{ScannerError, ScannerResult};

/// HTTP provider for chains with standard Ethereum headers.
pub type Provider = RootProvider<Http<Client>>;

/// HTTP provider for proof-of-authority chains.
pub type PoaProvider = RootProvider<Http<Client>, AnyNetwork>;

/// A provider whose network type was picked from the chain's endpoint flags.
#[derive(Clone)]
pub enum ChainProvider {
    /// Standard Ethereum header layout.
    Standard(Provider),
    /// Proof-of-authority header layout.
    ProofOfAuthority(PoaProvider),
}

impl ChainProvider {
    /// Whether this provider was built for a proof-of-authority chain.
    #[must_use]
    pub const fn is_proof_of_authority(&self) -> bool {
        matches!(self, Self::ProofOfAuthority(_))
    }
}

/// Create an HTTP provider for one chain endpoint.
///
/// # Errors
///
/// Returns an RPC error if the endpoint URL cannot be parsed.
#[allow(clippy::unused_async)]
#[instrument(skip(endpoint), fields(rpc_host = tracing::field::Empty, poa = endpoint.proof_of_authority()))]
pub async fn create_provider(endpoint: &EndpointConfig) -> ScannerResult<ChainProvider> {
    let rpc_url = endpoint.rpc_url();

    // Log only scheme and host; path segments may carry API keys
    let host = rpc_url
        .split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or("unknown");
    tracing::Span::current().record("rpc_host", host);

    let url = rpc_url.parse().map_err(|e| {
        ScannerError::rpc(
            format!("Failed to parse RPC URL: '{rpc_url}'"),
            Some(Box::new(e)),
        )
    })?;

    let provider = if endpoint.proof_of_authority() {
        debug!(rpc_host = host, "Creating proof-of-authority HTTP provider");
        ChainProvider::ProofOfAuthority(
            ProviderBuilder::new().network::<AnyNetwork>().on_http(url),
        )
    } else {
        debug!(rpc_host = host, "Creating HTTP provider");
        ChainProvider::Standard(ProviderBuilder::new().on_http(url))
    };

    info!("RPC provider initialized successfully");

    Ok(provider)
}

/// Get the current head block number.
///
/// # Errors
///
/// Returns an RPC error if the request fails.
#[instrument(skip(provider), fields(block = tracing::field::Empty, duration_ms = tracing::field::Empty))]
pub async fn get_latest_block(provider: &ChainProvider) -> ScannerResult<u64> {
    let start = std::time::Instant::now();
    let block_number = match provider {
        ChainProvider::Standard(p) => p.get_block_number().await,
        ChainProvider::ProofOfAuthority(p) => p.get_block_number().await,
    }
    .map_err(|e| ScannerError::rpc("Failed to fetch latest block number", Some(Box::new(e))))?;

    let duration = start.elapsed();
    tracing::Span::current().record("block", block_number);
    tracing::Span::current().record("duration_ms", duration.as_millis() as u64);

    debug!(block = block_number, "Latest block fetched");

    Ok(block_number)
}

/// Fetch every log matching `filter`.
///
/// # Errors
///
/// Returns an RPC error if the request fails, including provider-side limits
/// on result size or block span.
#[instrument(skip(provider, filter), fields(logs = tracing::field::Empty))]
pub async fn get_logs(provider: &ChainProvider, filter: &Filter) -> ScannerResult<Vec<Log>> {
    let logs = match provider {
        ChainProvider::Standard(p) => p.get_logs(filter).await,
        ChainProvider::ProofOfAuthority(p) => p.get_logs(filter).await,
    }
    .map_err(|e| ScannerError::rpc("Failed to fetch Deposit logs", Some(Box::new(e))))?;

    tracing::Span::current().record("logs", logs.len());

    Ok(logs)
}

/// Check that the provider answers a head-height query.
///
/// # Errors
///
/// Returns an RPC error if the endpoint is unreachable.
#[instrument(skip(provider))]
pub async fn check_connection(provider: &ChainProvider) -> ScannerResult<u64> {
    match get_latest_block(provider).await {
        Ok(block) => {
            info!(block, "Connection check successful");
            Ok(block)
        }
        Err(e) => {
            warn!(error = %e, "Connection check failed");
            Err(ScannerError::rpc(
                format!("Provider connection health check failed: {e}"),
                Some(Box::new(e)),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_provider_invalid_url() {
        let endpoint = EndpointConfig::new("not a url", false);
        let result = create_provider(&endpoint).await;
        assert!(matches!(result, Err(ScannerError::RpcError { .. })));
    }

    #[tokio::test]
    async fn test_poa_flag_selects_network() {
        let poa = create_provider(&EndpointConfig::new("http://localhost:8545", true)).await;
        assert!(matches!(poa, Ok(ref p) if p.is_proof_of_authority()));

        let standard = create_provider(&EndpointConfig::new("http://localhost:8545", false)).await;
        assert!(matches!(standard, Ok(ref p) if !p.is_proof_of_authority()));
    }

    #[tokio::test]
    #[ignore = "Requires network access to the BSC testnet"]
    async fn test_get_latest_block_integration() {
        let endpoint = EndpointConfig::new("https://data-seed-prebsc-1-s1.binance.org:8545/", true);
        if let Ok(provider) = create_provider(&endpoint).await {
            let block = get_latest_block(&provider).await;
            assert!(matches!(block, Ok(b) if b > 0));
        }
    }
}
