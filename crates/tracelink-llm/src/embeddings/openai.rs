//! OpenAI embedding provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use tracelink_config::EmbeddingConfig;
use tracelink_core::{EmbeddingError, EmbeddingProvider};

/// Request structure for the OpenAI embeddings API
#[derive(Debug, Serialize)]
struct OpenAIEmbeddingRequest {
    model: String,
    input: Vec<String>,
    encoding_format: String,
}

/// Response structure from the OpenAI embeddings API
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// OpenAI embedding provider.
///
/// Sends the whole batch in a single request; the response is re-sorted
/// by index because the API does not guarantee order.
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    timeout_secs: u64,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider from configuration.
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        config
            .validate()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| EmbeddingError::Config("API key is required".to_string()))?;

        let dimensions = config.expected_dimensions();

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint,
            api_key,
            model: config.model,
            dimensions,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = OpenAIEmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
            encoding_format: "float".to_string(),
        };

        let url = format!("{}/embeddings", self.endpoint);
        tracing::debug!("Sending {} texts to {}", texts.len(), url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
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

        let mut parsed: OpenAIEmbeddingResponse = response.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_creation() {
        let provider =
            OpenAIEmbeddingProvider::new(EmbeddingConfig::openai("sk-test".to_string(), None))
                .unwrap();
        assert_eq!(provider.provider_name(), "OpenAI");
        assert_eq!(provider.model_name(), "text-embedding-3-small");
        assert_eq!(provider.dimensions(), 1536);
    }

    #[test]
    fn creation_requires_api_key() {
        let mut config = EmbeddingConfig::openai("sk-test".to_string(), None);
        config.api_key = None;
        assert!(OpenAIEmbeddingProvider::new(config).is_err());
    }

    #[test]
    fn request_serialization() {
        let request = OpenAIEmbeddingRequest {
            model: "text-embedding-3-small".to_string(),
            input: vec!["chest pain".to_string()],
            encoding_format: "float".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"], serde_json::json!(["chest pain"]));
        assert_eq!(json["encoding_format"], "float");
    }

    #[test]
    fn response_deserialization_preserves_index() {
        let json = r#"{
            "data": [
                {"embedding": [0.2], "index": 1},
                {"embedding": [0.1], "index": 0}
            ],
            "model": "text-embedding-3-small"
        }"#;
        let mut response: OpenAIEmbeddingResponse = serde_json::from_str(json).unwrap();
        response.data.sort_by_key(|d| d.index);
        assert_eq!(response.data[0].embedding, vec![0.1]);
        assert_eq!(response.data[1].embedding, vec![0.2]);
    }
}
