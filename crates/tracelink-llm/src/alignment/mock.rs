//! Deterministic alignment provider for tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracelink_core::{AlignmentError, AlignmentProvider, AlignmentRequest, RawLinkingMap};

/// Mock alignment provider returning a canned linking map.
///
/// Queued errors are yielded first, one per call, before the canned map;
/// this drives retry-path tests without any network.
pub struct MockAlignmentProvider {
    response: serde_json::Value,
    errors: Mutex<VecDeque<AlignmentError>>,
    calls: AtomicUsize,
}

impl MockAlignmentProvider {
    /// Provider that always answers with the given linking-map JSON.
    pub fn returning(response: serde_json::Value) -> Self {
        Self {
            response,
            errors: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that answers with an empty linking map.
    pub fn empty() -> Self {
        Self::returning(serde_json::json!({"linking_map": []}))
    }

    /// Queue errors to be returned before the canned response.
    pub fn with_errors(self, errors: Vec<AlignmentError>) -> Self {
        *self.errors.lock().expect("mock errors lock") = errors.into();
        self
    }

    /// Number of `align` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlignmentProvider for MockAlignmentProvider {
    async fn align(&self, _request: &AlignmentRequest) -> Result<RawLinkingMap, AlignmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.errors.lock().expect("mock errors lock").pop_front() {
            return Err(error);
        }

        serde_json::from_value(self.response.clone())
            .map_err(|e| AlignmentError::InvalidResponse(e.to_string()))
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> AlignmentRequest {
        AlignmentRequest {
            system_prompt: "align".to_string(),
            transcript_turns: vec!["turn".to_string()],
            summary_blocks: vec!["block".to_string()],
        }
    }

    #[tokio::test]
    async fn returns_canned_map_and_counts_calls() {
        let mock = MockAlignmentProvider::returning(json!({
            "linking_map": [{"summary_index": 0, "transcript_indices": [0]}]
        }));

        let raw = mock.align(&request()).await.unwrap();
        assert_eq!(raw.linking_map.len(), 1);
        assert_eq!(mock.call_count(), 1);

        mock.align(&request()).await.unwrap();
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn queued_errors_come_first() {
        let mock = MockAlignmentProvider::empty()
            .with_errors(vec![AlignmentError::Timeout { seconds: 1 }]);

        let first = mock.align(&request()).await;
        assert!(matches!(first, Err(AlignmentError::Timeout { .. })));

        let second = mock.align(&request()).await;
        assert!(second.is_ok());
        assert_eq!(mock.call_count(), 2);
    }
}
