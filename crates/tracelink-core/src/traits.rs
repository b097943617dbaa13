//! Provider traits implemented by the outbound crates
//!
//! The traits live here so the orchestration layer can depend on
//! abstractions while concrete HTTP providers stay in their own crate.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AlignmentError, EmbeddingError};
use crate::types::RawLinkingMap;

/// Everything the alignment model needs for one run.
///
/// The turn and block texts are sent as plain indexed arrays; the model
/// answers in terms of those indices.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentRequest {
    #[serde(skip)]
    pub system_prompt: String,
    pub transcript_turns: Vec<String>,
    pub summary_blocks: Vec<String>,
}

/// A service that proposes a linking map between summary blocks and
/// transcript turns.
///
/// Implementations must not mutate the request and must return the map
/// exactly as produced, unvalidated; bounds checking belongs to the
/// validator.
#[async_trait]
pub trait AlignmentProvider: Send + Sync {
    async fn align(&self, request: &AlignmentRequest) -> Result<RawLinkingMap, AlignmentError>;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}

/// A service that turns texts into fixed-length embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in input
    /// order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Model identifier; part of the cache key
    fn model_name(&self) -> &str;

    /// Vector length this model produces
    fn dimensions(&self) -> usize;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_shape() {
        let request = AlignmentRequest {
            system_prompt: "align".to_string(),
            transcript_turns: vec!["turn a".to_string()],
            summary_blocks: vec!["block a".to_string()],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "transcript_turns": ["turn a"],
                "summary_blocks": ["block a"]
            })
        );
    }
}
