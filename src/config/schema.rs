//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! reconciler. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the payment reconciler.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// HTTP API settings.
    pub server: ServerConfig,

    /// Chain RPC settings.
    pub chain: ChainConfig,

    /// Verification engine and sweep settings.
    pub verifier: VerifierConfig,

    /// Intent store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain-agnostic network identifier, `namespace:reference`
    /// (e.g. "eip155:1" for Ethereum mainnet, "eip155:31337" for Anvil).
    pub chain_id: String,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: "eip155:31337".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Verification engine and sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// How many recent blocks to scan for a qualifying transfer. Matches
    /// older than the window are never found; shrink this if the node
    /// rejects large ranges.
    pub scan_blocks: u64,

    /// Default confirmation depth for intents that don't specify one.
    pub default_min_confirmations: u64,

    /// Interval between verification sweeps in milliseconds.
    pub sweep_interval_ms: u64,

    /// Maximum intents verified concurrently within one sweep.
    pub sweep_concurrency: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            scan_blocks: 120,
            default_min_confirmations: 3,
            sweep_interval_ms: 10_000,
            sweep_concurrency: 4,
        }
    }
}

/// Intent store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Optional JSON snapshot path. When set, the store is loaded from the
    /// file at startup and saved on shutdown.
    pub persistence_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
