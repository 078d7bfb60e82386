//! Blockchain RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Query chain state (network id, block number, blocks, logs)
//! - Handle timeouts and network errors gracefully
//! - Provide health check for chain connectivity

use alloy::consensus::Transaction;
use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionResponse;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::eth::Filter;
use alloy::sol;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::client::ChainClient;
use crate::chain::types::{
    ChainError, ChainRef, ChainResult, NativeTransfer, NetworkId, TokenTransfer,
};
use crate::config::schema::ChainConfig;
use crate::observability::metrics;

sol! {
    /// Canonical ERC20 transfer event.
    #[derive(Debug)]
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Chain RPC client over alloy providers with failover support.
#[derive(Clone)]
pub struct RpcChainClient {
    /// Providers in priority order (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configured network identifier.
    chain: ChainRef,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Create a new chain client from configuration.
    pub fn new(config: ChainConfig) -> ChainResult<Self> {
        let chain = ChainRef::parse(&config.chain_id)?;
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url))
                    as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = %chain,
            failovers = config.failover_urls.len(),
            "Chain client initialized"
        );

        Ok(Self {
            providers,
            chain,
            config,
            timeout_duration,
        })
    }

    /// The configured chain identifier.
    pub fn chain(&self) -> &ChainRef {
        &self.chain
    }

    /// Verify the connected node reports the configured network id.
    pub async fn verify_network(&self) -> ChainResult<()> {
        let expected = self
            .chain
            .eip155()
            .ok_or_else(|| ChainError::InvalidId(self.chain.to_string()))?;
        let reported = self.network_id().await?;
        if reported.0 != expected {
            return Err(ChainError::Mismatch {
                expected,
                actual: reported.0,
            });
        }
        Ok(())
    }

    /// Whether the chain is reachable (can query the block number).
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.latest_block().await.is_ok();
        metrics::record_collaborator_health("chain_rpc", healthy);
        healthy
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn network_id(&self) -> ChainResult<NetworkId> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(NetworkId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(ChainError::Rpc("All providers failed to report network id".to_string()))
    }

    async fn latest_block(&self) -> ChainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(ChainError::Rpc("All providers failed to get block number".to_string()))
    }

    async fn block_with_transactions(&self, number: u64) -> ChainResult<Vec<NativeTransfer>> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider
                .get_block_by_number(BlockNumberOrTag::Number(number))
                .full();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(Some(block))) => {
                    let transfers = block
                        .transactions
                        .txns()
                        .map(|tx| NativeTransfer {
                            tx_hash: tx.tx_hash().to_string(),
                            to: tx.to(),
                            value: tx.value(),
                        })
                        .collect();
                    return Ok(transfers);
                }
                Ok(Ok(None)) => return Ok(Vec::new()),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to fetch block {number}"
        )))
    }

    async fn filtered_logs(
        &self,
        contract: Address,
        recipient: Address,
        from_block: u64,
        to_block: u64,
    ) -> ChainResult<Vec<TokenTransfer>> {
        let filter = Filter::new()
            .address(contract)
            .event(Transfer::SIGNATURE)
            .topic2(recipient.into_word())
            .from_block(from_block)
            .to_block(to_block);

        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_logs(&filter);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(logs)) => {
                    let transfers = logs
                        .iter()
                        .filter_map(|log| {
                            let decoded = log.log_decode::<Transfer>().ok()?;
                            Some(TokenTransfer {
                                tx_hash: log
                                    .transaction_hash
                                    .map(|h| h.to_string())
                                    .unwrap_or_default(),
                                block_number: log.block_number?,
                                to: decoded.inner.to,
                                value: decoded.inner.value,
                            })
                        })
                        .collect();
                    return Ok(transfers);
                }
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(ChainError::Rpc(format!(
            "All providers failed to fetch logs for blocks {from_block}..={to_block}"
        )))
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.chain.to_string())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
