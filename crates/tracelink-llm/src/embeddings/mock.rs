//! Deterministic embedding provider for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracelink_core::{content_hash, EmbeddingError, EmbeddingProvider};

const MOCK_DIMENSIONS: usize = 8;

/// Mock embedding provider.
///
/// Vectors are derived from the content hash, so identical text always
/// maps to an identical vector and different texts almost never collide.
/// Call counters let tests assert how many batches actually reached the
/// provider.
pub struct MockEmbeddingProvider {
    calls: AtomicUsize,
    texts_embedded: AtomicUsize,
    failing: AtomicBool,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed_batch` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total number of texts embedded across all calls.
    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    /// Deterministic vector for a text, derived from its content hash.
    pub fn vector_for(text: &str) -> Vec<f32> {
        let hash = content_hash(text);
        hash.as_bytes()
            .chunks(hash.len() / MOCK_DIMENSIONS)
            .take(MOCK_DIMENSIONS)
            .map(|chunk| {
                let sum: u32 = chunk.iter().map(|b| *b as u32).sum();
                (sum % 1000) as f32 / 1000.0 + 0.001
            })
            .collect()
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Transport("mock failure".to_string()));
        }

        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }

    fn dimensions(&self) -> usize {
        MOCK_DIMENSIONS
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
