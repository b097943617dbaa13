//! Embedding providers and the content-hash cache
//!
//! Providers implement [`tracelink_core::EmbeddingProvider`]; the
//! [`CachingEmbeddingClient`] wraps any of them with the process-wide
//! cache so a text is embedded at most once per model.

mod cache;
mod mock;
mod ollama;
mod openai;

pub use cache::{CacheStats, CachedEmbedding, CachingEmbeddingClient, EmbeddingCache};
pub use mock::MockEmbeddingProvider;
pub use ollama::OllamaEmbeddingProvider;
pub use openai::OpenAIEmbeddingProvider;

use std::sync::Arc;

use tracelink_config::{EmbeddingConfig, EmbeddingProviderType};
use tracelink_core::{EmbeddingError, EmbeddingProvider};

/// Create an embedding provider from configuration.
pub fn create_embedding_provider(
    config: EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match config.provider {
        EmbeddingProviderType::OpenAI => {
            Ok(Arc::new(OpenAIEmbeddingProvider::new(config)?))
        }
        EmbeddingProviderType::Ollama => {
            Ok(Arc::new(OllamaEmbeddingProvider::new(config)?))
        }
        EmbeddingProviderType::Mock => Ok(Arc::new(MockEmbeddingProvider::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_selects_provider_by_type() {
        let provider =
            create_embedding_provider(EmbeddingConfig::openai("sk-test".to_string(), None))
                .unwrap();
        assert_eq!(provider.provider_name(), "OpenAI");
        assert_eq!(provider.dimensions(), 1536);

        let provider = create_embedding_provider(EmbeddingConfig::ollama(None, None)).unwrap();
        assert_eq!(provider.provider_name(), "Ollama");
        assert_eq!(provider.dimensions(), 768);

        let provider = create_embedding_provider(EmbeddingConfig::default()).unwrap();
        assert_eq!(provider.provider_name(), "Mock");
    }

    #[test]
    fn factory_propagates_invalid_config() {
        let mut config = EmbeddingConfig::openai("sk-test".to_string(), None);
        config.api_key = None;
        assert!(create_embedding_provider(config).is_err());
    }
}
