//! HTTP boundary.
//!
//! Thin transport over the four boundary operations. Handlers never touch
//! stored status directly; everything routes through the orchestrator.

pub mod server;

pub use server::{AppState, HttpServer};
