//! Configuration foundation for tracelink
//!
//! All settings the alignment stack needs live here: the alignment model
//! call, the embedding provider, and the semantic scoring heuristics.
//! This crate depends on nothing else in the workspace so that every other
//! crate can depend on it without cycles.

pub mod alignment;
pub mod embedding;
pub mod error;
pub mod scoring;

pub use alignment::AlignmentConfig;
pub use embedding::{EmbeddingConfig, EmbeddingProviderType};
pub use error::{ConfigError, ConfigResult};
pub use scoring::ScoringConfig;

use serde::{Deserialize, Serialize};

/// Top-level configuration for one alignment deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Alignment model call settings
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Semantic scoring thresholds and keyword sets
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Config {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            alignment: AlignmentConfig::from_env()?,
            embedding: EmbeddingConfig::from_env()?,
            scoring: ScoringConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.alignment.validate()?;
        self.embedding.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}
