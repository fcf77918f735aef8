//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::resolve_run;
use crate::types::HydraConfig;
use std::path::Path;

/// Loads and validates a `hydra.toml` configuration from `path`.
pub fn load_config(path: &Path) -> Result<HydraConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `hydra.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<HydraConfig, ConfigError> {
    let config: HydraConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks required fields, then that the configuration resolves to a
/// runnable grid and search.
fn validate_config(config: &HydraConfig) -> Result<(), ConfigError> {
    if config.network.name.trim().is_empty() {
        return Err(ConfigError::MissingField("network.name".to_string()));
    }
    resolve_run(config)?;
    Ok(())
}
