//! HTTP-level tests for the embedding providers against a local mock server

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tracelink_config::EmbeddingConfig;
use tracelink_core::{EmbeddingError, EmbeddingProvider};
use tracelink_llm::{OllamaEmbeddingProvider, OpenAIEmbeddingProvider};

fn openai_config(endpoint: String) -> EmbeddingConfig {
    let mut config = EmbeddingConfig::openai("sk-test".to_string(), None);
    config.endpoint = endpoint;
    config.timeout_secs = 1;
    config
}

fn ollama_config(endpoint: String) -> EmbeddingConfig {
    let mut config = EmbeddingConfig::ollama(Some(endpoint), None);
    config.timeout_secs = 1;
    config
}

#[tokio::test]
async fn openai_batch_restores_input_order() {
    let server = MockServer::start().await;

    // Out-of-order data array; the provider must sort by index.
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "encoding_format": "float"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"embedding": [0.2, 0.2], "index": 1},
                {"embedding": [0.1, 0.1], "index": 0}
            ],
            "model": "text-embedding-3-small"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddingProvider::new(openai_config(server.uri())).unwrap();
    let vectors = provider
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors[0], vec![0.1, 0.1]);
    assert_eq!(vectors[1], vec![0.2, 0.2]);
}

#[tokio::test]
async fn openai_count_mismatch_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.1], "index": 0}],
            "model": "text-embedding-3-small"
        })))
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddingProvider::new(openai_config(server.uri())).unwrap();
    let result = provider
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await;
    assert!(matches!(result, Err(EmbeddingError::InvalidResponse(_))));
}

#[tokio::test]
async fn openai_api_error_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddingProvider::new(openai_config(server.uri())).unwrap();
    let result = provider.embed_batch(&["a".to_string()]).await;
    assert!(matches!(result, Err(EmbeddingError::Api { status: 429, .. })));
}

#[tokio::test]
async fn openai_empty_batch_skips_network() {
    let server = MockServer::start().await;
    // No mock mounted: any request would 404 and fail the test.

    let provider = OpenAIEmbeddingProvider::new(openai_config(server.uri())).unwrap();
    let vectors = provider.embed_batch(&[]).await.unwrap();
    assert!(vectors.is_empty());
}

#[tokio::test]
async fn ollama_embeds_one_prompt_per_request() {
    let server = MockServer::start().await;
    let vector: Vec<f32> = vec![0.5; 768];

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({"model": "nomic-embed-text"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": vector})))
        .expect(2)
        .mount(&server)
        .await;

    let provider = OllamaEmbeddingProvider::new(ollama_config(server.uri())).unwrap();
    let vectors = provider
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0].len(), 768);
}

#[tokio::test]
async fn ollama_wrong_dimensions_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.1, 0.2, 0.3]})),
        )
        .mount(&server)
        .await;

    let provider = OllamaEmbeddingProvider::new(ollama_config(server.uri())).unwrap();
    let result = provider.embed_batch(&["short".to_string()]).await;
    assert!(matches!(
        result,
        Err(EmbeddingError::DimensionMismatch { left: 768, right: 3 })
    ));
}
