//! Creation-input validation.
//!
//! Pure checks only; the engine layers reference-uniqueness and chain
//! matching on top.

use alloy::primitives::{Address, U256};
use serde::Deserialize;

use crate::intent::types::{Asset, AssetKind};

/// Raw creation request as received from the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentInput {
    pub chain_id: String,
    pub asset: AssetInput,
    pub recipient: String,
    /// Positive integer amount in base units, as a decimal string.
    pub amount: String,
    pub reference: String,
    /// Unix-epoch seconds; must be in the future.
    pub expires_at: u64,
    /// Falls back to the engine's configured default when omitted.
    #[serde(default)]
    pub min_confirmations: Option<u64>,
}

/// Raw asset description; widened integer so out-of-range precision is a
/// validation error rather than a deserialization one.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetInput {
    pub symbol: String,
    pub decimals: i64,
    pub kind: AssetKind,
    #[serde(default)]
    pub contract_address: Option<String>,
}

/// Parsed, well-formed creation input.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedInput {
    pub recipient: Address,
    pub amount: U256,
    pub asset: Asset,
}

/// Validate everything checkable without collaborators.
pub(crate) fn validate(input: &CreateIntentInput, now: u64) -> Result<ValidatedInput, String> {
    let recipient: Address = input
        .recipient
        .parse()
        .map_err(|_| format!("recipient '{}' is not a valid address", input.recipient))?;

    if input.amount.is_empty() || !input.amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "amount '{}' is not a positive integer in base units",
            input.amount
        ));
    }
    let amount = U256::from_str_radix(&input.amount, 10)
        .map_err(|_| format!("amount '{}' exceeds the representable range", input.amount))?;
    if amount.is_zero() {
        return Err("amount must be greater than zero".to_string());
    }

    if input.asset.symbol.is_empty() {
        return Err("asset symbol must not be empty".to_string());
    }
    if !(0..=i64::from(u8::MAX)).contains(&input.asset.decimals) {
        return Err(format!(
            "asset decimals {} out of range 0..=255",
            input.asset.decimals
        ));
    }

    let contract_address = match (input.asset.kind, input.asset.contract_address.as_deref()) {
        (AssetKind::Erc20, Some(raw)) => Some(
            raw.parse::<Address>()
                .map_err(|_| format!("contract address '{raw}' is not a valid address"))?,
        ),
        (AssetKind::Erc20, None) => {
            return Err("erc20 assets require a contract address".to_string());
        }
        (AssetKind::Native, Some(_)) => {
            return Err("native assets must not carry a contract address".to_string());
        }
        (AssetKind::Native, None) => None,
    };

    if input.reference.is_empty() {
        return Err("reference must not be empty".to_string());
    }
    if input.expires_at <= now {
        return Err(format!(
            "expires_at {} is not in the future",
            input.expires_at
        ));
    }

    Ok(ValidatedInput {
        recipient,
        amount,
        asset: Asset {
            symbol: input.asset.symbol.clone(),
            decimals: input.asset.decimals as u8,
            kind: input.asset.kind,
            contract_address,
        },
    })
}
