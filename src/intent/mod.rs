//! Payment intent model and lifecycle.
//!
//! # Lifecycle
//! ```text
//! PENDING ──▶ DETECTED ──▶ CONFIRMED (terminal)
//!    │            │
//!    │            ├──▶ EXPIRED  (terminal)
//!    │            └──▶ FAILED   (terminal)
//!    ├──▶ CONFIRMED / EXPIRED / FAILED
//! ```
//!
//! # Design Decisions
//! - Transitions never regress toward PENDING or DETECTED
//! - Terminal states accept no further transitions
//! - The transition table is a pure lookup with no I/O

pub mod state;
pub mod types;

pub use state::{can_transition, transition_status, TransitionError};
pub use types::{Asset, AssetKind, ConfirmationPolicy, IntentStatus, PaymentIntent};
