//! Error taxonomy for the outbound model calls
//!
//! One enum per concern. `is_retryable()` gates the bounded retry loop in
//! the provider crate: only transport timeouts qualify. API rejections,
//! malformed payloads, and configuration mistakes will not improve on a
//! second attempt.

use thiserror::Error;

/// Errors from the alignment (chat-completion) call.
#[derive(Debug, Error)]
pub enum AlignmentError {
    /// Connection-level failure reaching the endpoint
    #[error("Alignment transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Alignment request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The endpoint answered with a non-success status
    #[error("Alignment API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not carry the expected linking-map envelope
    #[error("Invalid alignment response: {0}")]
    InvalidResponse(String),

    /// The provider was constructed from unusable settings
    #[error("Alignment configuration error: {0}")]
    Config(String),
}

impl AlignmentError {
    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AlignmentError::Timeout { .. })
    }
}

/// Errors from the embedding call or vector math.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Connection-level failure reaching the endpoint
    #[error("Embedding transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Embedding request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The endpoint answered with a non-success status
    #[error("Embedding API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the request (count, shape)
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    /// Two vectors of different lengths were compared
    #[error("Dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// The provider was constructed from unusable settings
    #[error("Embedding configuration error: {0}")]
    Config(String),
}

impl EmbeddingError {
    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EmbeddingError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_retryable() {
        assert!(AlignmentError::Timeout { seconds: 180 }.is_retryable());
        assert!(!AlignmentError::Transport("refused".into()).is_retryable());
        assert!(!AlignmentError::Api {
            status: 500,
            message: "server error".into()
        }
        .is_retryable());
        assert!(!AlignmentError::InvalidResponse("no linking_map".into()).is_retryable());

        assert!(EmbeddingError::Timeout { seconds: 15 }.is_retryable());
        assert!(!EmbeddingError::DimensionMismatch { left: 3, right: 4 }.is_retryable());
    }

    #[test]
    fn error_messages_name_the_concern() {
        let err = AlignmentError::Api {
            status: 401,
            message: "invalid api key".into(),
        };
        assert!(err.to_string().contains("401"));

        let err = EmbeddingError::DimensionMismatch { left: 1536, right: 768 };
        assert!(err.to_string().contains("1536"));
    }
}
