//! Verification orchestration.
//!
//! # Responsibilities
//! - Interval sweep over all non-terminal intents
//! - On-demand single-intent verification
//! - Resolve the next persisted status through the lifecycle state machine
//! - Append one audit event per attempt
//!
//! # Design Decisions
//! - Sweep and on-demand triggers share the in-flight table, so a sweep
//!   racing a trigger for the same id performs one chain scan
//! - A failure on one intent marks that intent FAILED and the sweep moves
//!   on; one bad intent never aborts the batch

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::chain::client::ChainClient;
use crate::intent::state::can_transition;
use crate::intent::types::{unix_now, IntentStatus};
use crate::observability::metrics;
use crate::store::types::{EventRecord, StoreError, StoredIntent, VerificationMeta};
use crate::store::IntentStore;
use crate::verify::engine::VerificationEngine;
use crate::verify::input::CreateIntentInput;
use crate::verify::request::{build_request, PaymentRequest};
use crate::verify::types::{EngineError, VerificationResult};
use crate::orchestrator::inflight::InflightTable;

/// Sweep scheduling configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub interval: Duration,
    pub concurrency: usize,
}

/// Errors surfaced by boundary operations.
#[derive(Debug, Error)]
pub enum OrchestrateError {
    #[error("intent not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service health, composed from both collaborators.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub chain_id: String,
    pub rpc_connected: bool,
    pub db_status: &'static str,
}

/// Drives the verification engine over the store's pending intents.
pub struct Orchestrator {
    engine: Arc<VerificationEngine>,
    client: Arc<dyn ChainClient>,
    store: Arc<dyn IntentStore>,
    inflight: InflightTable,
    config: SweepConfig,
}

impl Orchestrator {
    pub fn new(
        engine: Arc<VerificationEngine>,
        client: Arc<dyn ChainClient>,
        store: Arc<dyn IntentStore>,
        config: SweepConfig,
    ) -> Self {
        Self {
            engine,
            client,
            store,
            inflight: InflightTable::new(),
            config,
        }
    }

    /// Create an intent, persist it, and derive its payment request.
    pub async fn create_intent(
        &self,
        input: CreateIntentInput,
    ) -> Result<(StoredIntent, PaymentRequest), EngineError> {
        let intent = self.engine.create_intent(input, self.store.as_ref()).await?;
        let stored = StoredIntent::new(intent);

        self.store.create_intent(stored.clone()).await?;
        self.store
            .append_event(EventRecord::intent_created(&stored.intent))
            .await?;
        metrics::record_intent_created(stored.intent.asset.kind.as_str());

        let request = build_request(&stored.intent);
        Ok((stored, request))
    }

    /// Fetch an intent with its verification metadata.
    pub async fn get_intent(&self, id: &str) -> Result<StoredIntent, OrchestrateError> {
        self.store
            .get_intent(id)
            .await?
            .ok_or_else(|| OrchestrateError::NotFound(id.to_string()))
    }

    /// Verify one intent now, coalescing with any in-flight check for the
    /// same id.
    pub async fn verify_intent(&self, id: &str) -> Result<VerificationResult, OrchestrateError> {
        let stored = self.get_intent(id).await?;
        let result = self
            .inflight
            .run_or_join(id, || self.verify_and_apply(stored))
            .await;
        Ok(result)
    }

    /// Service health: chain reachable on the configured network, store up.
    pub async fn health(&self) -> HealthReport {
        let chain_id = self.engine.chain_id().clone();
        let (rpc_connected, network_matches) = match self.client.network_id().await {
            Ok(reported) => (true, chain_id.eip155() == Some(reported.0)),
            Err(e) => {
                tracing::warn!(error = %e, "Health probe could not reach chain RPC");
                (false, false)
            }
        };
        metrics::record_collaborator_health("chain_rpc", rpc_connected && network_matches);
        let db_ok = self.store.is_healthy().await;

        HealthReport {
            ok: rpc_connected && network_matches && db_ok,
            chain_id: chain_id.to_string(),
            rpc_connected,
            db_status: if db_ok { "ok" } else { "unavailable" },
        }
    }

    /// Run the interval sweep until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.config.interval.as_millis() as u64,
            concurrency = self.config.concurrency,
            "Verification sweep starting"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Verification sweep received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One pass over every non-terminal intent.
    pub async fn sweep(&self) {
        let pending = match self.store.list_pending_intents().await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list pending intents");
                return;
            }
        };
        metrics::record_pending_intents(pending.len());
        if pending.is_empty() {
            return;
        }
        tracing::debug!(count = pending.len(), "Sweeping pending intents");

        futures_util::stream::iter(pending)
            .for_each_concurrent(self.config.concurrency, |stored| async move {
                let id = stored.intent.id.clone();
                if let Err(e) = self.verify_intent(&id).await {
                    tracing::error!(intent_id = %id, error = %e, "Sweep verification failed");
                }
            })
            .await;
    }

    /// Verify and persist: the unit of work the in-flight table serializes
    /// per intent id.
    async fn verify_and_apply(&self, stored: StoredIntent) -> VerificationResult {
        let result = self.engine.verify(&stored.intent).await;
        metrics::record_verification(result.status.as_str());

        match self.apply(&stored, &result).await {
            Ok(()) => result,
            Err(e) => {
                tracing::error!(
                    intent_id = %stored.intent.id,
                    error = %e,
                    "Failed to persist verification outcome; marking intent failed"
                );
                let reason = format!("verification bookkeeping failed: {e}");
                let failure = VerificationResult {
                    status: IntentStatus::Failed,
                    tx_hash: None,
                    confirmations: None,
                    reason: Some(reason),
                    error_code: None,
                };
                let meta = VerificationMeta {
                    tx_hash: None,
                    confirmations: None,
                    last_checked_at: Some(unix_now()),
                };
                let _ = self
                    .store
                    .update_intent_status(&stored.intent.id, IntentStatus::Failed, meta)
                    .await;
                let _ = self
                    .store
                    .append_event(EventRecord::verification(
                        &stored.intent.id,
                        stored.intent.status,
                        IntentStatus::Failed,
                        true,
                        &failure,
                    ))
                    .await;
                failure
            }
        }
    }

    /// Resolve the next status through the state machine and write back.
    ///
    /// Results that would move backward or past a terminal state are
    /// ignored, not errors: a stale scan must never undo settled history.
    async fn apply(
        &self,
        stored: &StoredIntent,
        result: &VerificationResult,
    ) -> Result<(), StoreError> {
        let current = stored.intent.status;
        let next = if current.is_terminal() || result.status == current {
            current
        } else if can_transition(current, result.status) {
            result.status
        } else {
            tracing::debug!(
                intent_id = %stored.intent.id,
                from = %current,
                to = %result.status,
                "Ignoring non-applicable verification status"
            );
            current
        };

        let changed = self
            .store
            .update_intent_status(&stored.intent.id, next, VerificationMeta::from_result(result))
            .await?;

        self.store
            .append_event(EventRecord::verification(
                &stored.intent.id,
                current,
                next,
                changed,
                result,
            ))
            .await?;

        if changed && next != current {
            tracing::info!(
                intent_id = %stored.intent.id,
                from = %current,
                to = %next,
                tx_hash = result.tx_hash.as_deref().unwrap_or(""),
                "Intent status advanced"
            );
            metrics::record_status_transition(current.as_str(), next.as_str());
        }
        Ok(())
    }
}
