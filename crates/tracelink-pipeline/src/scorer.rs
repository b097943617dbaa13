//! Explainable confidence scoring for validated links
//!
//! Tiered decision: headers short-circuit, embeddings decide when
//! available, and a pure lexical heuristic acts as tie-breaker and as the
//! degraded mode when the embedding call fails. Every score carries a
//! human-readable reason.

use std::collections::HashSet;
use std::sync::Arc;

use tracelink_config::ScoringConfig;
use tracelink_core::{cosine_similarity, ContentKind, EmbeddingError, SummaryBlock};
use tracelink_llm::CachingEmbeddingClient;

/// One scoring verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkScore {
    pub likely_match: bool,
    /// In [0, 1]
    pub confidence: f64,
    pub reason: String,
}

/// Scores a summary block against a transcript turn.
pub struct SemanticScorer {
    config: ScoringConfig,
    embeddings: Option<Arc<CachingEmbeddingClient>>,
}

impl SemanticScorer {
    /// Scorer that uses only the lexical heuristic.
    pub fn lexical_only(config: ScoringConfig) -> Self {
        Self {
            config,
            embeddings: None,
        }
    }

    /// Scorer that prefers embedding similarity, with lexical fallback.
    pub fn with_embeddings(config: ScoringConfig, client: Arc<CachingEmbeddingClient>) -> Self {
        Self {
            config,
            embeddings: Some(client),
        }
    }

    /// Score one block/turn pair.
    pub async fn score_link(&self, block: &SummaryBlock, turn_text: &str) -> LinkScore {
        if block.is_header {
            return LinkScore {
                likely_match: true,
                confidence: 1.0,
                reason: "header block, skipped".to_string(),
            };
        }

        let Some(client) = &self.embeddings else {
            return self.lexical_score(&block.text, turn_text);
        };

        match self.embedding_similarity(client, &block.text, turn_text).await {
            Ok(similarity) => self.tiered_score(similarity, &block.text, turn_text),
            Err(e) => {
                tracing::warn!("Embedding unavailable, using lexical fallback: {}", e);
                let mut score = self.lexical_score(&block.text, turn_text);
                score.reason = format!("embedding unavailable, lexical fallback: {}", score.reason);
                score
            }
        }
    }

    async fn embedding_similarity(
        &self,
        client: &CachingEmbeddingClient,
        block_text: &str,
        turn_text: &str,
    ) -> Result<f64, EmbeddingError> {
        let block_vectors = client
            .embed(&[block_text.to_string()], ContentKind::SummaryBlock)
            .await?;
        let turn_vectors = client
            .embed(&[turn_text.to_string()], ContentKind::TranscriptTurn)
            .await?;
        cosine_similarity(&block_vectors[0], &turn_vectors[0])
    }

    /// Decide from cosine similarity, consulting the lexical heuristic in
    /// the borderline band. Disagreement in that band rejects the link.
    fn tiered_score(&self, similarity: f64, block_text: &str, turn_text: &str) -> LinkScore {
        let confidence = similarity.clamp(0.0, 1.0);

        if similarity >= self.config.accept_threshold {
            return LinkScore {
                likely_match: true,
                confidence,
                reason: format!("cosine similarity {:.3} at or above accept threshold", similarity),
            };
        }

        if similarity >= self.config.review_threshold {
            let lexical = self.lexical_score(block_text, turn_text);
            if lexical.likely_match {
                return LinkScore {
                    likely_match: true,
                    confidence: (confidence + lexical.confidence) / 2.0,
                    reason: format!(
                        "borderline similarity {:.3} confirmed by lexical signal ({})",
                        similarity, lexical.reason
                    ),
                };
            }
            return LinkScore {
                likely_match: false,
                confidence,
                reason: format!(
                    "borderline similarity {:.3} rejected by lexical signal ({})",
                    similarity, lexical.reason
                ),
            };
        }

        LinkScore {
            likely_match: false,
            confidence,
            reason: format!("cosine similarity {:.3} below review threshold", similarity),
        }
    }

    /// Pure keyword/overlap heuristic, usable without any network.
    pub fn lexical_score(&self, summary_text: &str, transcript_text: &str) -> LinkScore {
        let summary = summary_text.to_lowercase();
        let transcript = transcript_text.to_lowercase();
        let summary_tokens = tokenize(&summary);
        let transcript_tokens = tokenize(&transcript);

        let summary_clinical = terms_present(&summary_tokens, &self.config.clinical_terms);
        let summary_lifestyle = terms_present(&summary_tokens, &self.config.lifestyle_terms);
        let transcript_clinical = terms_present(&transcript_tokens, &self.config.clinical_terms);
        let transcript_lifestyle = terms_present(&transcript_tokens, &self.config.lifestyle_terms);

        // One text purely clinical, the other purely lifestyle: these talk
        // about different things no matter how the words overlap.
        let summary_only_clinical = !summary_clinical.is_empty() && summary_lifestyle.is_empty();
        let summary_only_lifestyle = !summary_lifestyle.is_empty() && summary_clinical.is_empty();
        let transcript_only_clinical =
            !transcript_clinical.is_empty() && transcript_lifestyle.is_empty();
        let transcript_only_lifestyle =
            !transcript_lifestyle.is_empty() && transcript_clinical.is_empty();

        if (summary_only_clinical && transcript_only_lifestyle)
            || (summary_only_lifestyle && transcript_only_clinical)
        {
            let clinical = if summary_only_clinical {
                &summary_clinical
            } else {
                &transcript_clinical
            };
            let lifestyle = if summary_only_lifestyle {
                &summary_lifestyle
            } else {
                &transcript_lifestyle
            };
            return LinkScore {
                likely_match: false,
                confidence: 0.1,
                reason: format!(
                    "clinical/lifestyle category conflict ({} vs {})",
                    clinical.join(", "),
                    lifestyle.join(", ")
                ),
            };
        }

        let shared_clinical: Vec<&String> = summary_clinical
            .iter()
            .filter(|t| transcript_clinical.contains(*t))
            .collect();
        if !shared_clinical.is_empty() {
            let names: Vec<&str> = shared_clinical.iter().map(|s| s.as_str()).collect();
            return LinkScore {
                likely_match: true,
                confidence: (0.6 + 0.1 * shared_clinical.len() as f64).min(0.9),
                reason: format!("shared clinical terms: {}", names.join(", ")),
            };
        }

        let shared_lifestyle: Vec<&String> = summary_lifestyle
            .iter()
            .filter(|t| transcript_lifestyle.contains(*t))
            .collect();
        if !shared_lifestyle.is_empty() {
            let names: Vec<&str> = shared_lifestyle.iter().map(|s| s.as_str()).collect();
            return LinkScore {
                likely_match: true,
                confidence: (0.5 + 0.1 * shared_lifestyle.len() as f64).min(0.8),
                reason: format!("shared lifestyle terms: {}", names.join(", ")),
            };
        }

        // Share of the summary's significant words found in the turn.
        let summary_words = significant_words(&summary_tokens, &self.config.stop_words);
        let transcript_words = significant_words(&transcript_tokens, &self.config.stop_words);
        let ratio = if summary_words.is_empty() {
            0.0
        } else {
            let shared = summary_words.intersection(&transcript_words).count();
            shared as f64 / summary_words.len() as f64
        };

        LinkScore {
            likely_match: ratio >= self.config.overlap_ratio_threshold,
            confidence: ratio.min(1.0),
            reason: format!("word overlap ratio {:.2}", ratio),
        }
    }
}

fn tokenize(text: &str) -> HashSet<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Keywords match whole tokens only, so "work" never fires inside
/// "bloodwork".
fn terms_present(tokens: &HashSet<&str>, terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| tokens.contains(term.as_str()))
        .cloned()
        .collect()
}

fn significant_words<'a>(tokens: &HashSet<&'a str>, stop_words: &[String]) -> HashSet<&'a str> {
    tokens
        .iter()
        .copied()
        .filter(|w| w.len() > 3)
        .filter(|w| !stop_words.iter().any(|s| s == w))
        .collect()
}
