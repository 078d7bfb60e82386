//! Configuration subsystem.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ChainConfig, ObservabilityConfig, ReconcilerConfig, ServerConfig, StoreConfig, VerifierConfig,
};
pub use validation::{validate_config, ValidationError};
