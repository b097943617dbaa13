//! OpenAI-compatible alignment provider

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use tracelink_config::AlignmentConfig;
use tracelink_core::{AlignmentError, AlignmentProvider, AlignmentRequest, RawLinkingMap};

/// Alignment via an OpenAI-compatible chat-completions endpoint.
///
/// One JSON-mode chat call per run. Transcripts can be long, so the
/// timeout defaults to minutes; only transport timeouts are retried, with
/// a fixed backoff and a bounded attempt count from the configuration.
pub struct OpenAIAlignmentProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
    timeout: Duration,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl OpenAIAlignmentProvider {
    /// Create a provider from configuration.
    pub fn new(config: AlignmentConfig) -> Result<Self, AlignmentError> {
        config
            .validate()
            .map_err(|e| AlignmentError::Config(e.to_string()))?;

        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AlignmentError::Config("API key is required".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint,
            api_key,
            model: config.model,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    async fn align_once(&self, request: &AlignmentRequest) -> Result<RawLinkingMap, AlignmentError> {
        let user_payload = serde_json::to_string(request)
            .map_err(|e| AlignmentError::Config(format!("Failed to serialize request: {}", e)))?;

        let api_request = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": user_payload},
            ],
        });

        let url = format!("{}/chat/completions", self.endpoint);
        tracing::debug!(
            turns = request.transcript_turns.len(),
            blocks = request.summary_blocks.len(),
            "Sending alignment request to {}",
            url
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AlignmentError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    AlignmentError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AlignmentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            AlignmentError::InvalidResponse(format!("Failed to parse response envelope: {}", e))
        })?;

        let content = chat_response
            .choices
            .first()
            .ok_or_else(|| AlignmentError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .clone()
            .ok_or_else(|| {
                AlignmentError::InvalidResponse("No content in first choice".to_string())
            })?;

        parse_linking_map(&content)
    }
}

/// Parse a model reply into an untrusted linking map.
///
/// The reply must be a JSON object with a top-level `linking_map` array.
/// Index values inside the entries are deliberately left untyped here;
/// the validator decides what survives.
fn parse_linking_map(content: &str) -> Result<RawLinkingMap, AlignmentError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| AlignmentError::InvalidResponse(format!("Content is not JSON: {}", e)))?;

    if !value
        .get("linking_map")
        .map(serde_json::Value::is_array)
        .unwrap_or(false)
    {
        return Err(AlignmentError::InvalidResponse(
            "Content has no linking_map array".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AlignmentError::InvalidResponse(format!("Malformed linking_map: {}", e)))
}

#[async_trait]
impl AlignmentProvider for OpenAIAlignmentProvider {
    async fn align(&self, request: &AlignmentRequest) -> Result<RawLinkingMap, AlignmentError> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.align_once(request).await {
                Ok(raw) => return Ok(raw),
                Err(e) => {
                    if e.is_retryable() && attempt < self.max_attempts {
                        tracing::warn!(
                            "Alignment attempt {}/{} failed, retrying in {}ms: {}",
                            attempt,
                            self.max_attempts,
                            self.retry_backoff.as_millis(),
                            e
                        );
                        tokio::time::sleep(self.retry_backoff).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AlignmentError::Config("max_attempts must be at least 1".to_string())))
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
