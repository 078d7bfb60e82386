//! Stored intent and audit-event records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intent::types::{unix_now, IntentStatus, PaymentIntent};
use crate::verify::types::VerificationResult;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Inserting an id that already exists is a programmer error.
    #[error("intent id already exists: {0}")]
    DuplicateId(String),

    /// Snapshot file could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file could not be decoded.
    #[error("snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// An intent as persisted, with verification metadata merged in over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIntent {
    pub intent: PaymentIntent,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confirmations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_checked_at: Option<u64>,
}

impl StoredIntent {
    pub fn new(intent: PaymentIntent) -> Self {
        Self {
            intent,
            tx_hash: None,
            confirmations: None,
            last_checked_at: None,
        }
    }
}

/// Verification metadata to merge into a stored intent. `None` fields
/// leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationMeta {
    pub tx_hash: Option<String>,
    pub confirmations: Option<u64>,
    pub last_checked_at: Option<u64>,
}

impl VerificationMeta {
    /// Metadata carried by a verification result, stamped with the check time.
    pub fn from_result(result: &VerificationResult) -> Self {
        Self {
            tx_hash: result.tx_hash.clone(),
            confirmations: result.confirmations,
            last_checked_at: Some(unix_now()),
        }
    }
}

/// Audit-trail event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    IntentCreated,
    VerificationAttempted,
}

/// Append-only audit record; immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub intent_id: String,
    pub kind: EventKind,
    pub payload: serde_json::Value,
    pub created_at: u64,
}

impl EventRecord {
    /// Record for a freshly created intent.
    pub fn intent_created(intent: &PaymentIntent) -> Self {
        Self {
            intent_id: intent.id.clone(),
            kind: EventKind::IntentCreated,
            payload: serde_json::json!({
                "chain_id": intent.chain_id,
                "asset": intent.asset,
                "recipient": intent.recipient,
                "amount": intent.amount.to_string(),
                "reference": intent.reference,
                "expires_at": intent.expires_at,
            }),
            created_at: unix_now(),
        }
    }

    /// Record for one verification attempt, whether or not it changed status.
    pub fn verification(
        intent_id: &str,
        previous: IntentStatus,
        next: IntentStatus,
        changed: bool,
        result: &VerificationResult,
    ) -> Self {
        Self {
            intent_id: intent_id.to_string(),
            kind: EventKind::VerificationAttempted,
            payload: serde_json::json!({
                "previous_status": previous,
                "next_status": next,
                "changed": changed,
                "result_status": result.status,
                "tx_hash": result.tx_hash,
                "confirmations": result.confirmations,
                "error_code": result.error_code,
                "reason": result.reason,
            }),
            created_at: unix_now(),
        }
    }
}
