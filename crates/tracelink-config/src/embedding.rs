//! Settings for the embedding provider

use serde::{Deserialize, Serialize};
use std::env;

use crate::alignment::parse_env_or;
use crate::error::{ConfigError, ConfigResult};

/// Type of embedding provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// OpenAI embedding API
    OpenAI,
    /// Ollama local/remote embedding service
    Ollama,
    /// Deterministic in-process provider for testing
    Mock,
}

impl EmbeddingProviderType {
    /// Parse provider type from string
    pub fn parse(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingProviderType::OpenAI),
            "ollama" => Ok(EmbeddingProviderType::Ollama),
            "mock" => Ok(EmbeddingProviderType::Mock),
            _ => Err(ConfigError::Invalid(format!(
                "Unknown embedding provider type: {}. Valid options: openai, ollama, mock",
                s
            ))),
        }
    }

    /// Default endpoint for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            EmbeddingProviderType::OpenAI => "https://api.openai.com/v1",
            EmbeddingProviderType::Ollama => "http://localhost:11434",
            EmbeddingProviderType::Mock => "",
        }
    }

    /// Default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            EmbeddingProviderType::OpenAI => "text-embedding-3-small",
            EmbeddingProviderType::Ollama => "nomic-embed-text",
            EmbeddingProviderType::Mock => "mock-embed",
        }
    }

    /// Whether this provider requires an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, EmbeddingProviderType::OpenAI)
    }
}

/// Configuration for the embedding provider.
///
/// Embedding requests are small numeric batches, so the timeout stays on the
/// seconds scale in contrast to the minutes-scale alignment call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider type (openai, ollama, mock)
    pub provider: EmbeddingProviderType,

    /// API endpoint URL
    pub endpoint: String,

    /// API key (required for OpenAI)
    pub api_key: Option<String>,

    /// Model name to use for embeddings
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    /// Build from environment variables, with defaults for anything unset.
    ///
    /// Recognized variables: `EMBEDDING_PROVIDER`, `EMBEDDING_ENDPOINT`,
    /// `EMBEDDING_API_KEY` (falls back to `OPENAI_API_KEY`),
    /// `EMBEDDING_MODEL`, `EMBEDDING_TIMEOUT_SECS`.
    pub fn from_env() -> ConfigResult<Self> {
        let provider_str = env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let provider = EmbeddingProviderType::parse(&provider_str)?;

        let endpoint = env::var("EMBEDDING_ENDPOINT")
            .unwrap_or_else(|_| provider.default_endpoint().to_string());

        let api_key = env::var("EMBEDDING_API_KEY")
            .ok()
            .or_else(|| env::var("OPENAI_API_KEY").ok());

        let model =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| provider.default_model().to_string());

        let config = Self {
            provider,
            endpoint,
            api_key,
            model,
            timeout_secs: parse_env_or("EMBEDDING_TIMEOUT_SECS", 15)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration for the OpenAI provider
    pub fn openai(api_key: String, model: Option<String>) -> Self {
        Self {
            provider: EmbeddingProviderType::OpenAI,
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: Some(api_key),
            model: model.unwrap_or_else(|| "text-embedding-3-small".to_string()),
            timeout_secs: 15,
        }
    }

    /// Create configuration for an Ollama provider
    pub fn ollama(endpoint: Option<String>, model: Option<String>) -> Self {
        Self {
            provider: EmbeddingProviderType::Ollama,
            endpoint: endpoint.unwrap_or_else(|| "http://localhost:11434".to_string()),
            api_key: None,
            model: model.unwrap_or_else(|| "nomic-embed-text".to_string()),
            timeout_secs: 15,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.provider.requires_api_key() && self.api_key.is_none() {
            return Err(ConfigError::Missing(format!(
                "Provider {:?} requires an API key (set EMBEDDING_API_KEY)",
                self.provider
            )));
        }

        if self.provider != EmbeddingProviderType::Mock && self.endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "Embedding endpoint URL cannot be empty".to_string(),
            ));
        }

        if self.model.is_empty() {
            return Err(ConfigError::Invalid(
                "Embedding model name cannot be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "Embedding timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Expected vector dimensionality for the configured provider and model.
    ///
    /// The vector length is a property of the model alone; vectors from
    /// different models are never comparable.
    pub fn expected_dimensions(&self) -> usize {
        match (&self.provider, self.model.as_str()) {
            (EmbeddingProviderType::OpenAI, "text-embedding-3-small") => 1536,
            (EmbeddingProviderType::OpenAI, "text-embedding-3-large") => 3072,
            (EmbeddingProviderType::OpenAI, "text-embedding-ada-002") => 1536,
            (EmbeddingProviderType::Ollama, "nomic-embed-text") => 768,
            (EmbeddingProviderType::Mock, _) => 8,
            // Default to provider defaults for unknown models
            (EmbeddingProviderType::OpenAI, _) => 1536,
            (EmbeddingProviderType::Ollama, _) => 768,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::Mock,
            endpoint: String::new(),
            api_key: None,
            model: "mock-embed".to_string(),
            timeout_secs: 15,
        }
    }
}
