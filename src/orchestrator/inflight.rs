//! Per-intent in-flight verification table.
//!
//! Guarantees at most one verification runs per intent id at a time. The
//! first caller for an id becomes the leader and runs the work; concurrent
//! callers for the same id await the leader's result over a watch channel
//! instead of issuing a duplicate chain scan.

use std::future::Future;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

use crate::verify::types::{ErrorCode, VerificationResult};

type Slot = watch::Receiver<Option<VerificationResult>>;

/// Concurrent map of intent id → in-progress verification.
#[derive(Clone, Default)]
pub struct InflightTable {
    inner: Arc<DashMap<String, Slot>>,
}

enum Role {
    Leader(watch::Sender<Option<VerificationResult>>),
    Follower(Slot),
}

/// Clears the leader's slot even if the work panics, so the id is never
/// wedged.
struct SlotGuard<'a> {
    table: &'a DashMap<String, Slot>,
    id: &'a str,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.table.remove(self.id);
    }
}

impl InflightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of verifications currently in flight.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Run `work` for `id`, or join an already-running verification for the
    /// same id and receive its result.
    pub async fn run_or_join<F, Fut>(&self, id: &str, work: F) -> VerificationResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VerificationResult>,
    {
        // The map guard must not be held across an await.
        let role = match self.inner.entry(id.to_string()) {
            Entry::Occupied(slot) => Role::Follower(slot.get().clone()),
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(None);
                slot.insert(rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Leader(tx) => {
                let _slot = SlotGuard {
                    table: self.inner.as_ref(),
                    id,
                };
                let result = work().await;
                let _ = tx.send(Some(result.clone()));
                result
            }
            Role::Follower(mut rx) => {
                tracing::debug!(intent_id = %id, "Joining in-flight verification");
                loop {
                    if let Some(result) = rx.borrow_and_update().clone() {
                        return result;
                    }
                    if rx.changed().await.is_err() {
                        // Leader died without publishing.
                        return VerificationResult::failed(
                            ErrorCode::RpcError,
                            "verification aborted before completing",
                        );
                    }
                }
            }
        }
    }
}
