//! Payment Intent Reconciler
//!
//! Reconciles off-chain payment intents with on-chain blockchain activity.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌────────────────────────────────────────────────┐
//!                  │              PAYMENT RECONCILER                 │
//!                  │                                                 │
//!  POST /intents ──┼─▶ engine.create_intent ──▶ store ──▶ event     │
//!                  │                                                 │
//!  interval timer ─┼─┐                                               │
//!  POST /verify  ──┼─┼▶ inflight table ─▶ engine.verify ─▶ chain RPC │
//!                  │ │        │                                      │
//!                  │ │        ▼                                      │
//!                  │ │  state machine ─▶ store update ─▶ event       │
//!                  │ └────────────────────────────────────────────── │
//!                  │                                                 │
//!                  │  Cross-cutting: config · observability ·        │
//!                  │  lifecycle (graceful shutdown)                  │
//!                  └────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payment_reconciler::chain::rpc::RpcChainClient;
use payment_reconciler::config::{load_config, ReconcilerConfig};
use payment_reconciler::http::HttpServer;
use payment_reconciler::lifecycle::Shutdown;
use payment_reconciler::observability::metrics;
use payment_reconciler::orchestrator::{Orchestrator, SweepConfig};
use payment_reconciler::store::memory::MemoryStore;
use payment_reconciler::verify::engine::{EngineConfig, VerificationEngine};

#[derive(Parser, Debug)]
#[command(name = "payment-reconciler", about = "Reconcile payment intents with chain activity")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payment_reconciler=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("payment-reconciler v0.1.0 starting");

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ReconcilerConfig::default(),
    };

    tracing::info!(
        bind_address = %config.server.bind_address,
        chain_id = %config.chain.chain_id,
        rpc_url = %config.chain.rpc_url,
        scan_blocks = config.verifier.scan_blocks,
        sweep_interval_ms = config.verifier.sweep_interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = Arc::new(RpcChainClient::new(config.chain.clone())?);
    if let Err(e) = client.verify_network().await {
        tracing::warn!(error = %e, "Chain client started but network verification failed");
    }

    let store = Arc::new(match &config.store.persistence_path {
        Some(path) => MemoryStore::load_from_file(path)?,
        None => MemoryStore::new(None),
    });

    let engine = Arc::new(VerificationEngine::new(
        client.clone(),
        EngineConfig {
            chain_id: client.chain().clone(),
            scan_blocks: config.verifier.scan_blocks,
            default_min_confirmations: config.verifier.default_min_confirmations,
        },
    ));

    let orchestrator = Arc::new(Orchestrator::new(
        engine,
        client,
        store.clone(),
        SweepConfig {
            interval: Duration::from_millis(config.verifier.sweep_interval_ms),
            concurrency: config.verifier.sweep_concurrency,
        },
    ));

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    tokio::spawn(orchestrator.clone().run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(orchestrator, &config.server);
    server.run(listener, shutdown.subscribe()).await?;

    if let Err(e) = store.save_to_file().await {
        tracing::error!(error = %e, "Failed to save intent snapshot on shutdown");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
