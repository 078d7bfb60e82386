//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, windows non-empty)
//! - Check identifiers parse (chain id, URLs, bind addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ReconcilerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::chain::types::ChainRef;
use crate::config::schema::ReconcilerConfig;

/// A single configuration problem, pointing at the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn push(errors: &mut Vec<ValidationError>, field: &str, message: impl Into<String>) {
    errors.push(ValidationError {
        field: field.to_string(),
        message: message.into(),
    });
}

/// Validate the full configuration, collecting every problem.
pub fn validate_config(config: &ReconcilerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        push(
            &mut errors,
            "server.bind_address",
            format!("'{}' is not a valid socket address", config.server.bind_address),
        );
    }
    if config.server.request_timeout_secs == 0 {
        push(&mut errors, "server.request_timeout_secs", "must be greater than zero");
    }

    match ChainRef::parse(&config.chain.chain_id) {
        Ok(chain) => {
            if chain.eip155().is_none() {
                push(
                    &mut errors,
                    "chain.chain_id",
                    format!("'{}' has no numeric eip155 reference", config.chain.chain_id),
                );
            }
        }
        Err(e) => push(&mut errors, "chain.chain_id", e.to_string()),
    }
    if config.chain.rpc_url.parse::<url::Url>().is_err() {
        push(
            &mut errors,
            "chain.rpc_url",
            format!("'{}' is not a valid URL", config.chain.rpc_url),
        );
    }
    for (i, url) in config.chain.failover_urls.iter().enumerate() {
        if url.parse::<url::Url>().is_err() {
            push(
                &mut errors,
                &format!("chain.failover_urls[{i}]"),
                format!("'{url}' is not a valid URL"),
            );
        }
    }
    if config.chain.rpc_timeout_secs == 0 {
        push(&mut errors, "chain.rpc_timeout_secs", "must be greater than zero");
    }

    if config.verifier.scan_blocks == 0 {
        push(&mut errors, "verifier.scan_blocks", "must be at least 1");
    }
    if config.verifier.sweep_interval_ms == 0 {
        push(&mut errors, "verifier.sweep_interval_ms", "must be greater than zero");
    }
    if config.verifier.sweep_concurrency == 0 {
        push(&mut errors, "verifier.sweep_concurrency", "must be at least 1");
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        push(
            &mut errors,
            "observability.metrics_address",
            format!(
                "'{}' is not a valid socket address",
                config.observability.metrics_address
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ReconcilerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ReconcilerConfig::default();
        config.chain.chain_id = "mainnet".to_string();
        config.chain.rpc_url = "not a url".to_string();
        config.verifier.scan_blocks = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"chain.chain_id"));
        assert!(fields.contains(&"chain.rpc_url"));
        assert!(fields.contains(&"verifier.scan_blocks"));
    }

    #[test]
    fn test_non_numeric_eip155_reference_rejected() {
        let mut config = ReconcilerConfig::default();
        config.chain.chain_id = "eip155:base".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "chain.chain_id");
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let mut config = ReconcilerConfig::default();
        config.verifier.sweep_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }
}
