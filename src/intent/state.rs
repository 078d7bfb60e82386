//! Lifecycle state machine.
//!
//! Pure transition-legality lookup. Persisted status only ever moves
//! forward: once a transfer is detected it can settle, expire, or fail,
//! and terminal states accept nothing further.

use thiserror::Error;

use crate::intent::types::IntentStatus;

/// Rejected status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition from {from} to {to}")]
pub struct TransitionError {
    pub from: IntentStatus,
    pub to: IntentStatus,
}

/// Whether `from → to` is a legal lifecycle transition.
pub fn can_transition(from: IntentStatus, to: IntentStatus) -> bool {
    use IntentStatus::{Confirmed, Detected, Expired, Failed, Pending};
    matches!(
        (from, to),
        (Pending, Detected | Confirmed | Expired | Failed) | (Detected, Confirmed | Expired | Failed)
    )
}

/// Resolve the transition, failing with a [`TransitionError`] if illegal.
pub fn transition_status(
    from: IntentStatus,
    to: IntentStatus,
) -> Result<IntentStatus, TransitionError> {
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(TransitionError { from, to })
    }
}
