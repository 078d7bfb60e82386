//! In-memory intent store with optional JSON snapshot persistence.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::intent::state::can_transition;
use crate::intent::types::IntentStatus;
use crate::observability::metrics;
use crate::store::types::{
    EventRecord, StoreError, StoreResult, StoredIntent, VerificationMeta,
};
use crate::store::IntentStore;

/// On-disk snapshot shape.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    intents: HashMap<String, StoredIntent>,
    events: Vec<EventRecord>,
}

/// Thread-safe in-memory store.
///
/// Intents live in a concurrent map keyed by id; events in an append-only
/// log. When a persistence path is configured, the whole store snapshots
/// to a JSON file on save and reloads at startup.
#[derive(Clone, Default)]
pub struct MemoryStore {
    intents: Arc<DashMap<String, StoredIntent>>,
    events: Arc<RwLock<Vec<EventRecord>>>,
    persistence_path: Option<String>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<String>) -> Self {
        Self {
            intents: Arc::new(DashMap::new()),
            events: Arc::new(RwLock::new(Vec::new())),
            persistence_path,
        }
    }

    /// Load from a snapshot file if it exists.
    pub fn load_from_file(path: &str) -> StoreResult<Self> {
        let store = Self::new(Some(path.to_string()));
        if Path::new(path).exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;

            for (id, stored) in snapshot.intents {
                store.intents.insert(id, stored);
            }
            let count = store.intents.len();
            if let Ok(mut events) = store.events.try_write() {
                *events = snapshot.events;
            }
            tracing::info!(intents = count, "Loaded intent snapshot");
        }
        Ok(store)
    }

    /// Save a snapshot if a persistence path is configured.
    pub async fn save_to_file(&self) -> StoreResult<()> {
        if let Some(path) = &self.persistence_path {
            let intents: HashMap<String, StoredIntent> = self
                .intents
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect();
            let events = self.events.read().await.clone();
            let snapshot = Snapshot { intents, events };

            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer(writer, &snapshot)?;
            tracing::info!(intents = snapshot.intents.len(), "Saved intent snapshot");
        }
        Ok(())
    }

    /// Number of stored intents.
    pub fn count(&self) -> usize {
        self.intents.len()
    }
}

#[async_trait]
impl IntentStore for MemoryStore {
    async fn create_intent(&self, stored: StoredIntent) -> StoreResult<()> {
        let id = stored.intent.id.clone();
        match self.intents.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::DuplicateId(id)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(stored);
                Ok(())
            }
        }
    }

    async fn get_intent(&self, id: &str) -> StoreResult<Option<StoredIntent>> {
        Ok(self.intents.get(id).map(|r| r.value().clone()))
    }

    async fn list_pending_intents(&self) -> StoreResult<Vec<StoredIntent>> {
        Ok(self
            .intents
            .iter()
            .filter(|r| !r.value().intent.status.is_terminal())
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_by_reference(&self, reference: &str) -> StoreResult<Option<StoredIntent>> {
        Ok(self
            .intents
            .iter()
            .find(|r| r.value().intent.reference == reference)
            .map(|r| r.value().clone()))
    }

    async fn update_intent_status(
        &self,
        id: &str,
        target: IntentStatus,
        meta: VerificationMeta,
    ) -> StoreResult<bool> {
        let Some(mut entry) = self.intents.get_mut(id) else {
            return Ok(false);
        };
        let stored = entry.value_mut();
        let current = stored.intent.status;

        if current.is_terminal() {
            return Ok(false);
        }
        if target != current && !can_transition(current, target) {
            tracing::debug!(
                intent_id = %id,
                from = %current,
                to = %target,
                "Rejecting illegal status update"
            );
            return Ok(false);
        }

        let meta_changed = meta
            .tx_hash
            .as_ref()
            .is_some_and(|v| stored.tx_hash.as_ref() != Some(v))
            || meta
                .confirmations
                .is_some_and(|v| stored.confirmations != Some(v))
            || meta
                .last_checked_at
                .is_some_and(|v| stored.last_checked_at != Some(v));

        if target == current && !meta_changed {
            return Ok(false);
        }

        stored.intent.status = target;
        if let Some(tx_hash) = meta.tx_hash {
            stored.tx_hash = Some(tx_hash);
        }
        if let Some(confirmations) = meta.confirmations {
            stored.confirmations = Some(confirmations);
        }
        if let Some(last_checked_at) = meta.last_checked_at {
            stored.last_checked_at = Some(last_checked_at);
        }
        Ok(true)
    }

    async fn append_event(&self, event: EventRecord) -> StoreResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn events_for_intent(&self, id: &str) -> StoreResult<Vec<EventRecord>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.intent_id == id)
            .cloned()
            .collect())
    }

    async fn status_counts(&self) -> StoreResult<HashMap<IntentStatus, usize>> {
        let mut counts = HashMap::new();
        for r in self.intents.iter() {
            *counts.entry(r.value().intent.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn is_healthy(&self) -> bool {
        metrics::record_collaborator_health("store", true);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::types::{
        unix_now, Asset, AssetKind, ConfirmationPolicy, PaymentIntent,
    };
    use alloy::primitives::{Address, U256};

    fn test_intent(id: &str, reference: &str) -> StoredIntent {
        StoredIntent::new(PaymentIntent {
            id: id.to_string(),
            created_at: unix_now(),
            expires_at: unix_now() + 3600,
            chain_id: "eip155:31337".to_string(),
            asset: Asset {
                symbol: "ETH".to_string(),
                decimals: 18,
                kind: AssetKind::Native,
                contract_address: None,
            },
            recipient: Address::ZERO,
            amount: U256::from(100u64),
            reference: reference.to_string(),
            confirmation_policy: ConfirmationPolicy {
                min_confirmations: 2,
            },
            status: IntentStatus::Pending,
        })
    }

    fn meta(confirmations: u64, checked_at: u64) -> VerificationMeta {
        VerificationMeta {
            tx_hash: Some("0xabc".to_string()),
            confirmations: Some(confirmations),
            last_checked_at: Some(checked_at),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new(None);
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();

        let stored = store.get_intent("i1").await.unwrap().unwrap();
        assert_eq!(stored.intent.status, IntentStatus::Pending);
        assert!(store.get_intent("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_fails_loudly() {
        let store = MemoryStore::new(None);
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();
        let err = store.create_intent(test_intent("i1", "ref-2")).await;
        assert!(matches!(err, Err(StoreError::DuplicateId(_))));
    }

    #[tokio::test]
    async fn test_find_by_reference() {
        let store = MemoryStore::new(None);
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();

        assert!(store.find_by_reference("ref-1").await.unwrap().is_some());
        assert!(store.find_by_reference("ref-2").await.unwrap().is_none());
        assert!(store.reference_in_use("ref-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let store = MemoryStore::new(None);
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();

        let changed = store
            .update_intent_status("i1", IntentStatus::Detected, meta(1, 1000))
            .await
            .unwrap();
        assert!(changed);

        // Same target, same metadata: no-op.
        let changed = store
            .update_intent_status("i1", IntentStatus::Detected, meta(1, 1000))
            .await
            .unwrap();
        assert!(!changed);

        // Same target, fresher metadata: merge counts as a change.
        let changed = store
            .update_intent_status("i1", IntentStatus::Detected, meta(2, 1010))
            .await
            .unwrap();
        assert!(changed);
        let stored = store.get_intent("i1").await.unwrap().unwrap();
        assert_eq!(stored.confirmations, Some(2));
    }

    #[tokio::test]
    async fn test_illegal_transition_is_noop() {
        let store = MemoryStore::new(None);
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();
        store
            .update_intent_status("i1", IntentStatus::Detected, meta(1, 1000))
            .await
            .unwrap();

        let changed = store
            .update_intent_status("i1", IntentStatus::Pending, VerificationMeta::default())
            .await
            .unwrap();
        assert!(!changed);
        let stored = store.get_intent("i1").await.unwrap().unwrap();
        assert_eq!(stored.intent.status, IntentStatus::Detected);
    }

    #[tokio::test]
    async fn test_terminal_rejects_all_updates() {
        let store = MemoryStore::new(None);
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();
        store
            .update_intent_status("i1", IntentStatus::Confirmed, meta(3, 1000))
            .await
            .unwrap();

        for target in [
            IntentStatus::Pending,
            IntentStatus::Detected,
            IntentStatus::Confirmed,
            IntentStatus::Expired,
            IntentStatus::Failed,
        ] {
            let changed = store
                .update_intent_status("i1", target, meta(9, 2000))
                .await
                .unwrap();
            assert!(!changed, "terminal intent accepted update to {target}");
        }
        let stored = store.get_intent("i1").await.unwrap().unwrap();
        assert_eq!(stored.intent.status, IntentStatus::Confirmed);
        assert_eq!(stored.confirmations, Some(3));
    }

    #[tokio::test]
    async fn test_unknown_id_is_noop() {
        let store = MemoryStore::new(None);
        let changed = store
            .update_intent_status("ghost", IntentStatus::Detected, meta(1, 1000))
            .await
            .unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_list_pending_excludes_terminal() {
        let store = MemoryStore::new(None);
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();
        store.create_intent(test_intent("i2", "ref-2")).await.unwrap();
        store.create_intent(test_intent("i3", "ref-3")).await.unwrap();
        store
            .update_intent_status("i2", IntentStatus::Detected, meta(1, 1000))
            .await
            .unwrap();
        store
            .update_intent_status("i3", IntentStatus::Expired, VerificationMeta::default())
            .await
            .unwrap();

        let pending = store.list_pending_intents().await.unwrap();
        let mut ids: Vec<&str> = pending.iter().map(|s| s.intent.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["i1", "i2"]);

        let counts = store.status_counts().await.unwrap();
        assert_eq!(counts.get(&IntentStatus::Pending), Some(&1));
        assert_eq!(counts.get(&IntentStatus::Detected), Some(&1));
        assert_eq!(counts.get(&IntentStatus::Expired), Some(&1));
    }

    #[tokio::test]
    async fn test_events_are_append_only_per_intent() {
        let store = MemoryStore::new(None);
        let stored = test_intent("i1", "ref-1");
        store
            .append_event(EventRecord::intent_created(&stored.intent))
            .await
            .unwrap();

        let events = store.events_for_intent("i1").await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(store.events_for_intent("i2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let path = "test_store_snapshot.json";

        let store = MemoryStore::new(Some(path.to_string()));
        store.create_intent(test_intent("i1", "ref-1")).await.unwrap();
        store
            .update_intent_status("i1", IntentStatus::Detected, meta(1, 1000))
            .await
            .unwrap();
        store.save_to_file().await.unwrap();

        let loaded = MemoryStore::load_from_file(path).unwrap();
        let stored = loaded.get_intent("i1").await.unwrap().unwrap();
        assert_eq!(stored.intent.status, IntentStatus::Detected);
        assert_eq!(stored.confirmations, Some(1));

        std::fs::remove_file(path).unwrap_or_default();
    }
}
