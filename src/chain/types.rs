//! Chain-specific types and error definitions.

use alloy::primitives::{Address, U256};
use std::fmt;
use thiserror::Error;

/// Numeric network id as reported by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(pub u64);

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<NetworkId> for u64 {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Chain-agnostic network identifier in `namespace:reference` form,
/// e.g. `eip155:8453`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainRef {
    pub namespace: String,
    pub reference: String,
}

impl ChainRef {
    /// Parse a `namespace:reference` identifier.
    pub fn parse(s: &str) -> ChainResult<Self> {
        let (namespace, reference) = s
            .split_once(':')
            .ok_or_else(|| ChainError::InvalidId(s.to_string()))?;
        if namespace.is_empty() || reference.is_empty() {
            return Err(ChainError::InvalidId(s.to_string()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            reference: reference.to_string(),
        })
    }

    /// Numeric network id for `eip155` chains; `None` for other namespaces.
    pub fn eip155(&self) -> Option<u64> {
        if self.namespace == "eip155" {
            self.reference.parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Reported network id disagrees with configuration.
    #[error("network id mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: u64, actual: u64 },

    /// Malformed chain identifier.
    #[error("invalid chain identifier '{0}': expected namespace:reference")]
    InvalidId(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// A native-currency transfer as seen inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTransfer {
    pub tx_hash: String,
    /// `None` for contract-creation transactions.
    pub to: Option<Address>,
    pub value: U256,
}

/// A decoded ERC20 Transfer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub tx_hash: String,
    pub block_number: u64,
    pub to: Address,
    pub value: U256,
}
