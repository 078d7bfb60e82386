//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ReconcilerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ReconcilerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ReconcilerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [chain]
            chain_id = "eip155:8453"
            rpc_url = "https://mainnet.base.org"

            [verifier]
            scan_blocks = 50
            default_min_confirmations = 6
        "#;
        let config: ReconcilerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.chain.chain_id, "eip155:8453");
        assert_eq!(config.verifier.scan_blocks, 50);
        assert_eq!(config.verifier.default_min_confirmations, 6);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(validate_config(&config).is_ok());
    }
}
