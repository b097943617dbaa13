//! Outbound providers for tracelink
//!
//! Two provider families live here: alignment (chat-completion call that
//! proposes the linking map) and embeddings (OpenAI batch or Ollama
//! per-prompt). The embedding side adds a process-wide content-hash cache
//! so repeated texts never hit the network twice. Deterministic mock
//! providers are exported for downstream tests.

pub mod alignment;
pub mod embeddings;

pub use alignment::{create_alignment_provider, MockAlignmentProvider, OpenAIAlignmentProvider};
pub use embeddings::{
    create_embedding_provider, CacheStats, CachingEmbeddingClient, EmbeddingCache,
    MockEmbeddingProvider, OllamaEmbeddingProvider, OpenAIEmbeddingProvider,
};
