//! [`EventSource`] backed by a JSON-RPC node.

use alloy::primitives::Address;
use async_trait::async_trait;
use tracing::{debug, info};

use super::http::{create_provider, get_latest_block, get_logs, ChainProvider};
use crate::chain::Chain;
use crate::config::EndpointConfig;
use crate::error::ScannerResult;
use crate::events::{create_deposit_filter, decode_deposit_log, DepositLog};
use crate::scanner::EventSource;

/// Reads head heights and Deposit logs from one chain's RPC endpoint.
#[derive(Clone)]
pub struct RpcEventSource {
    chain: Chain,
    provider: ChainProvider,
}

impl RpcEventSource {
    /// Build the provider for `chain` from its endpoint descriptor.
    ///
    /// # Errors
    ///
    /// Returns an RPC error if the endpoint URL cannot be parsed.
    pub async fn connect(chain: Chain, endpoint: &EndpointConfig) -> ScannerResult<Self> {
        let provider = create_provider(endpoint).await?;
        info!(
            chain = %chain,
            poa = provider.is_proof_of_authority(),
            "Event source ready"
        );
        Ok(Self { chain, provider })
    }

    /// Underlying provider.
    #[must_use]
    pub const fn provider(&self) -> &ChainProvider {
        &self.provider
    }
}

#[async_trait]
impl EventSource for RpcEventSource {
    async fn current_head(&self) -> ScannerResult<u64> {
        get_latest_block(&self.provider).await
    }

    async fn query_deposits(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> ScannerResult<Vec<DepositLog>> {
        let filter = create_deposit_filter(contract, from_block, to_block);
        let logs = get_logs(&self.provider, &filter).await?;

        debug!(
            chain = %self.chain,
            from_block,
            to_block,
            logs = logs.len(),
            "Fetched Deposit logs"
        );

        logs.iter().map(decode_deposit_log).collect()
    }
}
