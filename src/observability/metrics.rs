//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reconciler_intents_created_total` (counter): creations by asset kind
//! - `reconciler_verifications_total` (counter): verification outcomes by status
//! - `reconciler_status_transitions_total` (counter): applied transitions
//! - `reconciler_pending_intents` (gauge): sweep backlog size
//! - `reconciler_collaborator_up` (gauge): 1=reachable, 0=unreachable

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a created intent.
pub fn record_intent_created(asset_kind: &str) {
    counter!("reconciler_intents_created_total", "asset_kind" => asset_kind.to_string())
        .increment(1);
}

/// Count a completed verification attempt by resulting status.
pub fn record_verification(status: &str) {
    counter!("reconciler_verifications_total", "status" => status.to_string()).increment(1);
}

/// Count an applied lifecycle transition.
pub fn record_status_transition(from: &str, to: &str) {
    counter!(
        "reconciler_status_transitions_total",
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}

/// Track how many intents the sweep found awaiting verification.
pub fn record_pending_intents(count: usize) {
    gauge!("reconciler_pending_intents").set(count as f64);
}

/// Track collaborator (chain RPC, store) reachability.
pub fn record_collaborator_health(collaborator: &'static str, healthy: bool) {
    gauge!("reconciler_collaborator_up", "collaborator" => collaborator)
        .set(if healthy { 1.0 } else { 0.0 });
}
