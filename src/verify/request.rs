//! Payment request derivation.
//!
//! Pure, deterministic mapping from an intent to a payment link and
//! human-readable instructions. No I/O.

use serde::{Deserialize, Serialize};

use crate::chain::types::ChainRef;
use crate::intent::types::{AssetKind, PaymentIntent};

/// Shareable payment instructions for one intent. The `uri` doubles as a
/// QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub uri: String,
    pub instructions: String,
}

/// Derive an EIP-681-style payment link and instructions from the intent.
pub fn build_request(intent: &PaymentIntent) -> PaymentRequest {
    let chain_suffix = ChainRef::parse(&intent.chain_id)
        .ok()
        .and_then(|c| c.eip155())
        .map(|id| format!("@{id}"))
        .unwrap_or_default();

    let uri = match (intent.asset.kind, intent.asset.contract_address) {
        (AssetKind::Erc20, Some(contract)) => format!(
            "ethereum:{contract}{chain_suffix}/transfer?address={}&uint256={}",
            intent.recipient, intent.amount
        ),
        _ => format!(
            "ethereum:{}{chain_suffix}?value={}",
            intent.recipient, intent.amount
        ),
    };

    let instructions = match intent.asset.kind {
        AssetKind::Native => format!(
            "Send exactly {} base units of {} ({} decimals) to {} on {}.",
            intent.amount, intent.asset.symbol, intent.asset.decimals, intent.recipient,
            intent.chain_id
        ),
        AssetKind::Erc20 => format!(
            "Transfer exactly {} base units of {} ({} decimals) to {} on {} using the token contract {}.",
            intent.amount,
            intent.asset.symbol,
            intent.asset.decimals,
            intent.recipient,
            intent.chain_id,
            intent
                .asset
                .contract_address
                .map(|a| a.to_string())
                .unwrap_or_default(),
        ),
    };

    PaymentRequest { uri, instructions }
}
