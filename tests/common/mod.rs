//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use payment_reconciler::chain::client::ChainClient;
use payment_reconciler::chain::types::{
    ChainError, ChainRef, ChainResult, NativeTransfer, NetworkId, TokenTransfer,
};
use payment_reconciler::orchestrator::{Orchestrator, SweepConfig};
use payment_reconciler::store::memory::MemoryStore;
use payment_reconciler::verify::engine::{EngineConfig, VerificationEngine};
use payment_reconciler::verify::input::{AssetInput, CreateIntentInput};
use payment_reconciler::intent::types::AssetKind;

pub const TEST_CHAIN: &str = "eip155:31337";
pub const TEST_NETWORK: u64 = 31337;

/// Scripted chain double with failure injection and call accounting.
#[derive(Default)]
pub struct MockChain {
    pub network: u64,
    pub latest: u64,
    pub blocks: HashMap<u64, Vec<NativeTransfer>>,
    pub logs: Vec<TokenTransfer>,
    pub rpc_down: AtomicBool,
    /// Incremented once per verification entry (`network_id` call).
    pub scans: AtomicU32,
    /// When set, `network_id` waits for a permit before answering, letting
    /// tests overlap verifications deterministically.
    pub gate: Option<Arc<Semaphore>>,
}

impl MockChain {
    pub fn new(latest: u64) -> Self {
        Self {
            network: TEST_NETWORK,
            latest,
            ..Self::default()
        }
    }

    pub fn with_network(mut self, network: u64) -> Self {
        self.network = network;
        self
    }

    pub fn with_block(mut self, number: u64, transfers: Vec<NativeTransfer>) -> Self {
        self.blocks.insert(number, transfers);
        self
    }

    pub fn with_log(mut self, log: TokenTransfer) -> Self {
        self.logs.push(log);
        self
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn scan_count(&self) -> u32 {
        self.scans.load(Ordering::SeqCst)
    }

    fn check_up(&self) -> ChainResult<()> {
        if self.rpc_down.load(Ordering::SeqCst) {
            Err(ChainError::Rpc("injected outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn network_id(&self) -> ChainResult<NetworkId> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| ChainError::Rpc("gate closed".to_string()))?;
            permit.forget();
        }
        self.check_up()?;
        Ok(NetworkId(self.network))
    }

    async fn latest_block(&self) -> ChainResult<u64> {
        self.check_up()?;
        Ok(self.latest)
    }

    async fn block_with_transactions(&self, number: u64) -> ChainResult<Vec<NativeTransfer>> {
        self.check_up()?;
        Ok(self.blocks.get(&number).cloned().unwrap_or_default())
    }

    async fn filtered_logs(
        &self,
        _contract: Address,
        recipient: Address,
        from_block: u64,
        to_block: u64,
    ) -> ChainResult<Vec<TokenTransfer>> {
        self.check_up()?;
        Ok(self
            .logs
            .iter()
            .filter(|log| {
                log.to == recipient && (from_block..=to_block).contains(&log.block_number)
            })
            .cloned()
            .collect())
    }
}

pub fn recipient() -> Address {
    "0x00000000000000000000000000000000000000aa".parse().unwrap()
}

pub fn token_contract() -> Address {
    "0x00000000000000000000000000000000000000bb".parse().unwrap()
}

pub fn native_tx(to: Address, value: u64) -> NativeTransfer {
    NativeTransfer {
        tx_hash: format!("0xtx{value}"),
        to: Some(to),
        value: U256::from(value),
    }
}

pub fn token_log(to: Address, value: u64, block_number: u64) -> TokenTransfer {
    TokenTransfer {
        tx_hash: format!("0xlog{block_number}"),
        block_number,
        to,
        value: U256::from(value),
    }
}

/// Wire an orchestrator over the mock chain and a fresh in-memory store.
pub fn build_orchestrator(
    chain: Arc<MockChain>,
    scan_blocks: u64,
    default_min_confirmations: u64,
) -> (Arc<Orchestrator>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(None));
    let engine = Arc::new(VerificationEngine::new(
        chain.clone(),
        EngineConfig {
            chain_id: ChainRef::parse(TEST_CHAIN).unwrap(),
            scan_blocks,
            default_min_confirmations,
        },
    ));
    let orchestrator = Arc::new(Orchestrator::new(
        engine,
        chain,
        store.clone(),
        SweepConfig {
            interval: Duration::from_millis(50),
            concurrency: 4,
        },
    ));
    (orchestrator, store)
}

pub fn native_input(amount: &str, reference: &str) -> CreateIntentInput {
    CreateIntentInput {
        chain_id: TEST_CHAIN.to_string(),
        asset: AssetInput {
            symbol: "ETH".to_string(),
            decimals: 18,
            kind: AssetKind::Native,
            contract_address: None,
        },
        recipient: recipient().to_string(),
        amount: amount.to_string(),
        reference: reference.to_string(),
        expires_at: far_future(),
        min_confirmations: None,
    }
}

pub fn erc20_input(amount: &str, reference: &str) -> CreateIntentInput {
    CreateIntentInput {
        chain_id: TEST_CHAIN.to_string(),
        asset: AssetInput {
            symbol: "USDC".to_string(),
            decimals: 6,
            kind: AssetKind::Erc20,
            contract_address: Some(token_contract().to_string()),
        },
        recipient: recipient().to_string(),
        amount: amount.to_string(),
        reference: reference.to_string(),
        expires_at: far_future(),
        min_confirmations: None,
    }
}

pub fn far_future() -> u64 {
    payment_reconciler::intent::types::unix_now() + 3600
}
