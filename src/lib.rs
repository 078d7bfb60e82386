//! Payment intent reconciler library.
//!
//! Reconciles off-chain payment intents with on-chain activity: given a
//! recipient, amount, asset, and expiry, decides whether a matching
//! transfer occurred and how confirmed it is.

pub mod chain;
pub mod config;
pub mod http;
pub mod intent;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod store;
pub mod verify;

pub use config::schema::ReconcilerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
