//! Ollama embedding provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use tracelink_config::EmbeddingConfig;
use tracelink_core::{EmbeddingError, EmbeddingProvider};

/// Request structure for the Ollama embedding API
#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest {
    model: String,
    prompt: String,
}

/// Response structure from the Ollama embedding API
#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding provider (local or remote).
///
/// The API takes one prompt per request, so a batch becomes sequential
/// calls. Dimension drift against the configured model is caught here
/// rather than surfacing later as a mismatch during similarity.
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    timeout_secs: u64,
}

impl OllamaEmbeddingProvider {
    /// Create a provider from configuration.
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        config
            .validate()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        let dimensions = config.expected_dimensions();

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint,
            model: config.model,
            dimensions,
            timeout_secs: config.timeout_secs,
        })
    }

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let request = OllamaEmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout {
                        seconds: self.timeout_secs,
                    }
                } else {
                    EmbeddingError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OllamaEmbeddingResponse = response.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        if parsed.embedding.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                left: self.dimensions,
                right: parsed.embedding.len(),
            });
        }

        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_single(text).await?);
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_creation() {
        let provider = OllamaEmbeddingProvider::new(EmbeddingConfig::ollama(None, None)).unwrap();
        assert_eq!(provider.provider_name(), "Ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");
        assert_eq!(provider.dimensions(), 768);
    }

    #[test]
    fn request_serialization() {
        let request = OllamaEmbeddingRequest {
            model: "nomic-embed-text".to_string(),
            prompt: "blood pressure check".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("nomic-embed-text"));
        assert!(json.contains("blood pressure check"));
    }

    #[test]
    fn response_deserialization() {
        let json = r#"{"embedding": [0.1, 0.2, 0.3]}"#;
        let response: OllamaEmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embedding, vec![0.1, 0.2, 0.3]);
    }
}
