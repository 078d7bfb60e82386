//! Intent data types.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Lifecycle status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    /// Awaiting a qualifying on-chain transfer.
    Pending,
    /// Transfer seen but not yet buried deep enough.
    Detected,
    /// Transfer confirmed at the required depth.
    Confirmed,
    /// Intent passed its expiry before confirmation.
    Expired,
    /// Verification failed permanently.
    Failed,
}

impl IntentStatus {
    /// Whether this status accepts no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Expired | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Detected => "DETECTED",
            Self::Confirmed => "CONFIRMED",
            Self::Expired => "EXPIRED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an asset is the chain's native currency or an ERC20 token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Native,
    Erc20,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Erc20 => "erc20",
        }
    }
}

/// Asset being paid: symbol, precision, and (for tokens) the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub decimals: u8,
    pub kind: AssetKind,
    /// Required iff `kind` is `Erc20`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub contract_address: Option<Address>,
}

/// How deep a matching transfer must be buried before it counts as settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPolicy {
    pub min_confirmations: u64,
}

/// An off-chain payment intent awaiting reconciliation with chain activity.
///
/// Constructed only by the verification engine. After creation, `status` is
/// mutated exclusively through the store's state-machine-guarded update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Opaque unique id (UUID v4 in string form).
    pub id: String,
    /// Unix-epoch seconds.
    pub created_at: u64,
    /// Unix-epoch seconds; always greater than `created_at`.
    pub expires_at: u64,
    /// Chain-agnostic network identifier, `namespace:reference` (e.g. `eip155:8453`).
    pub chain_id: String,
    pub asset: Asset,
    pub recipient: Address,
    /// Amount in base units. U256 so large token amounts never overflow.
    pub amount: U256,
    /// Globally unique creation-time reference. Uniqueness is enforced at
    /// creation and never rechecked afterwards.
    pub reference: String,
    pub confirmation_policy: ConfirmationPolicy,
    pub status: IntentStatus,
}

/// Current unix-epoch seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
