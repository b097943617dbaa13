//! Error type for configuration loading and validation

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value that cannot work
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A required setting is absent
    #[error("Missing configuration: {0}")]
    Missing(String),

    /// An environment variable could not be parsed
    #[error("Failed to parse {variable}: {message}")]
    Parse { variable: String, message: String },
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
