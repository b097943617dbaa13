//! Settings for the alignment model call

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{ConfigError, ConfigResult};

/// Configuration for the chat-completion call that proposes the linking map.
///
/// Transcripts can be long, so the timeout is on the order of minutes rather
/// than the seconds-scale timeout used for embeddings. Retry settings are
/// injectable so tests can run the bounded retry loop with zero delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// API endpoint base URL (OpenAI-compatible)
    pub endpoint: String,

    /// API key (required for hosted endpoints)
    pub api_key: Option<String>,

    /// Chat model used to propose links
    pub model: String,

    /// Sampling temperature; low, because the output must be structured JSON
    pub temperature: f64,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum number of attempts for transport timeouts (1 = no retry)
    pub max_attempts: u32,

    /// Fixed delay between retry attempts, in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4-turbo".to_string(),
            temperature: 0.1,
            timeout_secs: 180,
            max_attempts: 2,
            retry_backoff_ms: 2000,
        }
    }
}

impl AlignmentConfig {
    /// Build from environment variables, with defaults for anything unset.
    ///
    /// Recognized variables: `ALIGNMENT_ENDPOINT`, `OPENAI_API_KEY`,
    /// `ALIGNMENT_MODEL`, `ALIGNMENT_TIMEOUT_SECS`, `ALIGNMENT_MAX_ATTEMPTS`,
    /// `ALIGNMENT_RETRY_BACKOFF_MS`.
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();

        let config = Self {
            endpoint: env::var("ALIGNMENT_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key: env::var("OPENAI_API_KEY").ok(),
            model: env::var("ALIGNMENT_MODEL").unwrap_or(defaults.model),
            temperature: defaults.temperature,
            timeout_secs: parse_env_or("ALIGNMENT_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_attempts: parse_env_or("ALIGNMENT_MAX_ATTEMPTS", defaults.max_attempts)?,
            retry_backoff_ms: parse_env_or("ALIGNMENT_RETRY_BACKOFF_MS", defaults.retry_backoff_ms)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "Alignment endpoint URL cannot be empty".to_string(),
            ));
        }
        if self.model.is_empty() {
            return Err(ConfigError::Invalid(
                "Alignment model name cannot be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "Alignment timeout must be greater than 0".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "Alignment max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn parse_env_or<T: std::str::FromStr>(variable: &str, default: T) -> ConfigResult<T> {
    match env::var(variable) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Parse {
            variable: variable.to_string(),
            message: format!("could not parse value {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}
