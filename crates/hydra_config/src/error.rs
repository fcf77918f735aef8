//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `hydra.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("cannot read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("malformed hydra.toml: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("hydra.toml is missing `{0}`")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    ValidationError(String),

    /// The configured pruning strategy does not exist.
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
}
