//! Chain client capability interface.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::chain::types::{ChainResult, NativeTransfer, NetworkId, TokenTransfer};

/// The four chain capabilities the verification engine depends on.
///
/// Production uses [`crate::chain::RpcChainClient`]; tests inject a
/// scripted double so matching behavior is deterministic.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Network id the connected node reports.
    async fn network_id(&self) -> ChainResult<NetworkId>;

    /// Latest block number.
    async fn latest_block(&self) -> ChainResult<u64>;

    /// Native transfers contained in the given block. An unknown or
    /// not-yet-produced block yields an empty list.
    async fn block_with_transactions(&self, number: u64) -> ChainResult<Vec<NativeTransfer>>;

    /// ERC20 Transfer events for `contract` paying `recipient` within the
    /// inclusive block range.
    async fn filtered_logs(
        &self,
        contract: Address,
        recipient: Address,
        from_block: u64,
        to_block: u64,
    ) -> ChainResult<Vec<TokenTransfer>>;
}
