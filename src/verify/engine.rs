//! Chain verification engine.
//!
//! # Responsibilities
//! - Construct validated intents in `PENDING`
//! - Decide, per intent, whether a qualifying transfer exists on chain and
//!   how confirmed it is
//!
//! # Design Decisions
//! - Every ordinary outcome is a `VerificationResult` value; the engine
//!   never errors for chain-state reasons
//! - Expiry is checked before any RPC so dead intents cost nothing
//! - The scan window is bounded; transfers older than it are never found

use std::sync::Arc;

use alloy::primitives::Address;
use uuid::Uuid;

use crate::chain::client::ChainClient;
use crate::chain::types::{ChainRef, ChainResult};
use crate::intent::types::{unix_now, AssetKind, ConfirmationPolicy, IntentStatus, PaymentIntent};
use crate::store::IntentStore;
use crate::verify::input::{validate, CreateIntentInput};
use crate::verify::types::{EngineError, ErrorCode, VerificationResult};

/// Engine configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Network this deployment serves.
    pub chain_id: ChainRef,
    /// Scan window depth in blocks.
    pub scan_blocks: u64,
    /// Confirmation depth applied when an intent doesn't specify one.
    pub default_min_confirmations: u64,
}

/// Verifies intents against chain activity through an injected client.
pub struct VerificationEngine {
    client: Arc<dyn ChainClient>,
    config: EngineConfig,
}

impl VerificationEngine {
    pub fn new(client: Arc<dyn ChainClient>, config: EngineConfig) -> Self {
        Self { client, config }
    }

    /// The network this engine is configured for.
    pub fn chain_id(&self) -> &ChainRef {
        &self.config.chain_id
    }

    /// Validate input and construct a new intent in `PENDING`.
    ///
    /// Never partially constructs: all checks run before the id is even
    /// assigned. Reference uniqueness comes from the injected store, not
    /// process-global state.
    pub async fn create_intent(
        &self,
        input: CreateIntentInput,
        store: &dyn IntentStore,
    ) -> Result<PaymentIntent, EngineError> {
        let now = unix_now();
        let parsed = validate(&input, now).map_err(EngineError::Validation)?;

        let requested = ChainRef::parse(&input.chain_id)
            .map_err(|e| EngineError::Validation(e.to_string()))?;
        if requested != self.config.chain_id {
            return Err(EngineError::ChainMismatch {
                requested: requested.to_string(),
                configured: self.config.chain_id.to_string(),
            });
        }

        if store.reference_in_use(&input.reference).await? {
            return Err(EngineError::ReferenceInUse(input.reference));
        }

        let intent = PaymentIntent {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            expires_at: input.expires_at,
            chain_id: requested.to_string(),
            asset: parsed.asset,
            recipient: parsed.recipient,
            amount: parsed.amount,
            reference: input.reference,
            confirmation_policy: ConfirmationPolicy {
                min_confirmations: input
                    .min_confirmations
                    .unwrap_or(self.config.default_min_confirmations),
            },
            status: IntentStatus::Pending,
        };

        tracing::info!(
            intent_id = %intent.id,
            reference = %intent.reference,
            asset_kind = intent.asset.kind.as_str(),
            amount = %intent.amount,
            "Intent created"
        );
        Ok(intent)
    }

    /// Scan the chain for a transfer settling this intent.
    ///
    /// Matching binds only recipient and amount: concurrent intents sharing
    /// both can cross-match the same transfer. Callers needing stronger
    /// attribution must use distinct recipients or token references.
    pub async fn verify(&self, intent: &PaymentIntent) -> VerificationResult {
        // Stored intents are validated at creation, but snapshots may
        // outlive a configuration change.
        match ChainRef::parse(&intent.chain_id) {
            Ok(requested) if requested == self.config.chain_id => {}
            _ => {
                return VerificationResult::failed(
                    ErrorCode::ChainMismatch,
                    format!(
                        "intent targets {}, service is configured for {}",
                        intent.chain_id, self.config.chain_id
                    ),
                );
            }
        }

        if unix_now() >= intent.expires_at {
            return VerificationResult::expired(format!(
                "intent expired at {}",
                intent.expires_at
            ));
        }

        let reported = match self.client.network_id().await {
            Ok(id) => id,
            Err(e) => {
                return VerificationResult::failed(ErrorCode::RpcError, e.to_string());
            }
        };
        if self.config.chain_id.eip155() != Some(reported.0) {
            return VerificationResult::failed(
                ErrorCode::ChainMismatch,
                format!(
                    "node reports network {reported}, service is configured for {}",
                    self.config.chain_id
                ),
            );
        }

        let latest = match self.client.latest_block().await {
            Ok(block) => block,
            Err(e) => {
                return VerificationResult::failed(ErrorCode::RpcError, e.to_string());
            }
        };
        let floor = latest.saturating_sub(self.config.scan_blocks);

        let matched = match intent.asset.kind {
            AssetKind::Native => self.scan_native(intent, latest, floor).await,
            AssetKind::Erc20 => {
                let Some(contract) = intent.asset.contract_address else {
                    return VerificationResult::failed(
                        ErrorCode::ValidationError,
                        "erc20 intent has no contract address",
                    );
                };
                self.scan_erc20(intent, contract, latest, floor).await
            }
        };

        let matched = match matched {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(intent_id = %intent.id, error = %e, "Chain scan failed");
                return VerificationResult::failed(ErrorCode::RpcError, e.to_string());
            }
        };

        match matched {
            None => VerificationResult::pending(),
            Some((tx_hash, match_block)) => {
                let confirmations = latest - match_block + 1;
                let required = intent.confirmation_policy.min_confirmations;
                tracing::debug!(
                    intent_id = %intent.id,
                    tx_hash = %tx_hash,
                    block = match_block,
                    confirmations,
                    required,
                    "Qualifying transfer found"
                );
                if confirmations < required {
                    VerificationResult::detected(tx_hash, confirmations, required)
                } else {
                    VerificationResult::confirmed(tx_hash, confirmations)
                }
            }
        }
    }

    /// Walk blocks newest-first; the first block holding a qualifying
    /// transaction wins.
    async fn scan_native(
        &self,
        intent: &PaymentIntent,
        latest: u64,
        floor: u64,
    ) -> ChainResult<Option<(String, u64)>> {
        let mut number = latest;
        loop {
            let transfers = self.client.block_with_transactions(number).await?;
            if let Some(transfer) = transfers
                .iter()
                .find(|t| t.to == Some(intent.recipient) && t.value >= intent.amount)
            {
                return Ok(Some((transfer.tx_hash.clone(), number)));
            }
            if number == floor {
                return Ok(None);
            }
            number -= 1;
        }
    }

    /// One filtered log query over the window; newest qualifying transfer
    /// wins, mirroring the native path.
    async fn scan_erc20(
        &self,
        intent: &PaymentIntent,
        contract: Address,
        latest: u64,
        floor: u64,
    ) -> ChainResult<Option<(String, u64)>> {
        let logs = self
            .client
            .filtered_logs(contract, intent.recipient, floor, latest)
            .await?;
        let hit = logs
            .iter()
            .filter(|log| log.value >= intent.amount)
            .max_by_key(|log| log.block_number);
        Ok(hit.map(|log| (log.tx_hash.clone(), log.block_number)))
    }
}
