//! Intent persistence.
//!
//! # Responsibilities
//! - Durable keyed storage of intents
//! - Append-only audit event log
//! - Status updates guarded by the lifecycle state machine
//!
//! # Design Decisions
//! - Single-writer semantics; no distributed coordination
//! - Illegal or redundant status writes are no-ops, not errors, so the
//!   orchestrator's updates are idempotent
//! - The trait is the contract; `MemoryStore` is the in-process backend

pub mod memory;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::intent::types::IntentStatus;

pub use memory::MemoryStore;
pub use types::{EventKind, EventRecord, StoreError, StoreResult, StoredIntent, VerificationMeta};

/// Persistence contract for intents and their audit trail.
#[async_trait]
pub trait IntentStore: Send + Sync {
    /// Insert a new intent. A duplicate id fails loudly.
    async fn create_intent(&self, stored: StoredIntent) -> StoreResult<()>;

    /// Fetch an intent by id.
    async fn get_intent(&self, id: &str) -> StoreResult<Option<StoredIntent>>;

    /// All intents still awaiting settlement (`PENDING` or `DETECTED`).
    async fn list_pending_intents(&self) -> StoreResult<Vec<StoredIntent>>;

    /// Look up an intent by its creation-time reference.
    async fn find_by_reference(&self, reference: &str) -> StoreResult<Option<StoredIntent>>;

    /// Apply a status update and merge verification metadata.
    ///
    /// Returns `false` without writing when the id is unknown, the current
    /// status is terminal, the target equals the current status with
    /// unchanged metadata, or the transition is illegal.
    async fn update_intent_status(
        &self,
        id: &str,
        target: IntentStatus,
        meta: VerificationMeta,
    ) -> StoreResult<bool>;

    /// Append an audit event.
    async fn append_event(&self, event: EventRecord) -> StoreResult<()>;

    /// Audit events for one intent, oldest first.
    async fn events_for_intent(&self, id: &str) -> StoreResult<Vec<EventRecord>>;

    /// Per-status intent counts, for observability.
    async fn status_counts(&self) -> StoreResult<HashMap<IntentStatus, usize>>;

    /// Whether the backend is reachable.
    async fn is_healthy(&self) -> bool;

    /// Uniqueness predicate backing creation-time reference checks.
    async fn reference_in_use(&self, reference: &str) -> StoreResult<bool> {
        Ok(self.find_by_reference(reference).await?.is_some())
    }
}
