//! Process-wide embedding cache
//!
//! Keyed by (content hash, content kind, model). Vectors are immutable
//! once stored; only the access metadata changes. There is no expiry:
//! clinical phrasing repeats heavily across encounters and the point of
//! the cache is to never pay for the same embedding twice. `len()` and
//! `stats()` are exposed so an eviction policy can be added later without
//! changing the client API.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracelink_core::{content_hash, ContentKind, EmbeddingError, EmbeddingProvider};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    content_hash: String,
    kind: ContentKind,
    model: String,
}

/// One cached vector with its access metadata.
#[derive(Debug, Clone)]
pub struct CachedEmbedding {
    pub vector: Vec<f32>,
    pub model: String,
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
}

/// Counter snapshot for observability and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required embedding
    pub misses: u64,
    /// Batched provider calls actually issued
    pub outbound_requests: u64,
}

/// In-memory embedding store shared across alignment runs.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: DashMap<CacheKey, CachedEmbedding>,
    hits: AtomicU64,
    misses: AtomicU64,
    outbound_requests: AtomicU64,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a vector, bumping access metadata on hit.
    fn get(&self, content_hash: &str, kind: ContentKind, model: &str) -> Option<Vec<f32>> {
        let key = CacheKey {
            content_hash: content_hash.to_string(),
            kind,
            model: model.to_string(),
        };

        match self.entries.get_mut(&key) {
            Some(mut entry) => {
                entry.last_accessed = Utc::now();
                entry.access_count += 1;
                self.hits.fetch_add(1, Ordering::SeqCst);
                Some(entry.vector.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                None
            }
        }
    }

    /// Store a vector. An existing entry keeps its vector and metadata;
    /// the triple maps to at most one vector.
    fn insert(&self, content_hash: String, kind: ContentKind, model: String, vector: Vec<f32>) {
        let key = CacheKey {
            content_hash,
            kind,
            model: model.clone(),
        };
        let now = Utc::now();
        self.entries.entry(key).or_insert_with(|| CachedEmbedding {
            dimensions: vector.len(),
            vector,
            model,
            created_at: now,
            last_accessed: now,
            access_count: 0,
        });
    }

    fn record_outbound(&self) {
        self.outbound_requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of cached vectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Access count for a text's entry, if cached. Test hook.
    pub fn access_count(&self, text: &str, kind: ContentKind, model: &str) -> Option<u64> {
        let key = CacheKey {
            content_hash: content_hash(text),
            kind,
            model: model.to_string(),
        };
        self.entries.get(&key).map(|e| e.access_count)
    }

    /// Snapshot of the hit/miss/outbound counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            outbound_requests: self.outbound_requests.load(Ordering::SeqCst),
        }
    }
}

/// Embedding client that consults the cache before the provider.
///
/// Misses are collected and sent as one batch; results come back in input
/// order. A fully cached batch performs no network I/O at all.
pub struct CachingEmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<EmbeddingCache>,
}

impl CachingEmbeddingClient {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache: Arc<EmbeddingCache>) -> Self {
        Self { provider, cache }
    }

    /// Embed texts of one content kind, cache-first.
    pub async fn embed(
        &self,
        texts: &[String],
        kind: ContentKind,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.provider.model_name().to_string();
        let hashes: Vec<String> = texts.iter().map(|t| content_hash(t)).collect();

        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut miss_positions: Vec<usize> = Vec::new();

        for (position, hash) in hashes.iter().enumerate() {
            match self.cache.get(hash, kind, &model) {
                Some(vector) => results[position] = Some(vector),
                None => miss_positions.push(position),
            }
        }

        if !miss_positions.is_empty() {
            // One provider call for unique missing texts; duplicates within
            // the batch are embedded once.
            let mut unique_hashes: Vec<&str> = Vec::new();
            let mut unique_texts: Vec<String> = Vec::new();
            for &position in &miss_positions {
                let hash = hashes[position].as_str();
                if !unique_hashes.contains(&hash) {
                    unique_hashes.push(hash);
                    unique_texts.push(texts[position].clone());
                }
            }

            tracing::debug!(
                total = texts.len(),
                misses = unique_texts.len(),
                kind = kind.as_str(),
                "Embedding cache misses"
            );

            self.cache.record_outbound();
            let vectors = self.provider.embed_batch(&unique_texts).await?;

            if vectors.len() != unique_texts.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "Expected {} embeddings, got {}",
                    unique_texts.len(),
                    vectors.len()
                )));
            }

            for (hash, vector) in unique_hashes.iter().zip(vectors.iter()) {
                self.cache.insert(
                    hash.to_string(),
                    kind,
                    model.clone(),
                    vector.clone(),
                );
            }

            for &position in &miss_positions {
                let hash = hashes[position].as_str();
                let index = unique_hashes
                    .iter()
                    .position(|h| *h == hash)
                    .expect("miss hash was collected above");
                results[position] = Some(vectors[index].clone());
            }
        }

        Ok(results
            .into_iter()
            .map(|v| v.expect("every position filled by hit or miss path"))
            .collect())
    }

    /// The wrapped provider's model name.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Snapshot of the underlying cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
