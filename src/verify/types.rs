//! Verification result and error vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::intent::types::IntentStatus;
use crate::store::types::StoreError;

/// Machine-readable outcome codes carried on verification results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed input or an illegal requested transition.
    ValidationError,
    /// Chain client unreachable, timed out, or range limits exceeded.
    RpcError,
    /// Intent past its expiry.
    ExpiredError,
    /// Informational: match found, confirmations still insufficient.
    ConfirmationPending,
    /// Configured, reported, and intent networks disagree.
    ChainMismatch,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::RpcError => "RPC_ERROR",
            Self::ExpiredError => "EXPIRED_ERROR",
            Self::ConfirmationPending => "CONFIRMATION_PENDING",
            Self::ChainMismatch => "CHAIN_MISMATCH",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one verification attempt.
///
/// Transient: never persisted raw, only merged into stored intent metadata
/// and recorded in an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: IntentStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confirmations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_code: Option<ErrorCode>,
}

impl VerificationResult {
    /// No qualifying transfer in the scan window yet.
    pub fn pending() -> Self {
        Self {
            status: IntentStatus::Pending,
            tx_hash: None,
            confirmations: None,
            reason: None,
            error_code: None,
        }
    }

    /// Transfer seen but not yet buried to the required depth.
    pub fn detected(tx_hash: String, confirmations: u64, required: u64) -> Self {
        Self {
            status: IntentStatus::Detected,
            tx_hash: Some(tx_hash),
            confirmations: Some(confirmations),
            reason: Some(format!(
                "transfer found with {confirmations} of {required} required confirmations"
            )),
            error_code: Some(ErrorCode::ConfirmationPending),
        }
    }

    /// Transfer confirmed at the required depth.
    pub fn confirmed(tx_hash: String, confirmations: u64) -> Self {
        Self {
            status: IntentStatus::Confirmed,
            tx_hash: Some(tx_hash),
            confirmations: Some(confirmations),
            reason: None,
            error_code: None,
        }
    }

    /// Intent expired before a confirmed settlement.
    pub fn expired(reason: impl Into<String>) -> Self {
        Self {
            status: IntentStatus::Expired,
            tx_hash: None,
            confirmations: None,
            reason: Some(reason.into()),
            error_code: Some(ErrorCode::ExpiredError),
        }
    }

    /// Verification failed permanently with the given code.
    pub fn failed(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            status: IntentStatus::Failed,
            tx_hash: None,
            confirmations: None,
            reason: Some(reason.into()),
            error_code: Some(code),
        }
    }
}

/// Errors surfaced synchronously at intent creation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("reference '{0}' is already in use")]
    ReferenceInUse(String),

    #[error("chain mismatch: intent targets {requested}, service is configured for {configured}")]
    ChainMismatch {
        requested: String,
        configured: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Taxonomy code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::ReferenceInUse(_) => ErrorCode::ValidationError,
            Self::ChainMismatch { .. } => ErrorCode::ChainMismatch,
            Self::Store(_) => ErrorCode::RpcError,
        }
    }
}
