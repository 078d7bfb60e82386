//! Chain access subsystem.
//!
//! # Responsibilities
//! - Define the capability interface the verification engine scans through
//! - Connect to JSON-RPC endpoints with failover and per-call timeouts
//! - Parse and compare chain-agnostic network identifiers
//!
//! # Design Decisions
//! - The engine only sees [`client::ChainClient`]; the alloy-backed
//!   implementation lives in `rpc.rs` and tests inject a scripted double
//! - Every remote call is timeout-bounded; a timeout is an RPC error,
//!   never an unbounded hang

pub mod client;
pub mod rpc;
pub mod types;

pub use client::ChainClient;
pub use rpc::RpcChainClient;
pub use types::{ChainError, ChainRef, ChainResult, NativeTransfer, NetworkId, TokenTransfer};
