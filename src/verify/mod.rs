//! Chain verification engine.
//!
//! # Data Flow
//! ```text
//! creation request → input validation → reference check → PENDING intent
//! stored intent    → verify():
//!     chain match → expiry → reported network → latest block
//!     → native block walk | erc20 log filter
//!     → PENDING | DETECTED | CONFIRMED | EXPIRED | FAILED
//! ```

pub mod engine;
pub mod input;
pub mod request;
pub mod types;

pub use engine::{EngineConfig, VerificationEngine};
pub use input::{AssetInput, CreateIntentInput};
pub use request::{build_request, PaymentRequest};
pub use types::{EngineError, ErrorCode, VerificationResult};
