//! Verification orchestrator.
//!
//! # Data Flow
//! ```text
//! interval timer ─┐
//!                 ├─▶ inflight table ─▶ engine.verify ─▶ state machine
//! HTTP trigger  ──┘                                         │
//!                                                           ▼
//!                                            store update + audit event
//! ```

pub mod inflight;
pub mod sweep;

pub use inflight::InflightTable;
pub use sweep::{HealthReport, OrchestrateError, Orchestrator, SweepConfig};
