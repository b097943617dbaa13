//! Alignment providers
//!
//! The provider proposes a linking map between summary blocks and
//! transcript turns. Its output is untrusted; bounds validation happens
//! downstream.

mod mock;
mod openai;

pub use mock::MockAlignmentProvider;
pub use openai::OpenAIAlignmentProvider;

use std::sync::Arc;

use tracelink_config::AlignmentConfig;
use tracelink_core::{AlignmentError, AlignmentProvider};

/// Create an alignment provider from configuration.
pub fn create_alignment_provider(
    config: AlignmentConfig,
) -> Result<Arc<dyn AlignmentProvider>, AlignmentError> {
    let provider = OpenAIAlignmentProvider::new(config)?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_openai_provider() {
        let config = AlignmentConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let provider = create_alignment_provider(config).unwrap();
        assert_eq!(provider.provider_name(), "OpenAI");
    }

    #[test]
    fn factory_rejects_missing_api_key() {
        let config = AlignmentConfig::default();
        assert!(create_alignment_provider(config).is_err());
    }
}
