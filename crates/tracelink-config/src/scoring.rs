//! Settings for semantic link scoring
//!
//! The keyword sets are a configuration concern, not part of the scoring
//! algorithm: any reasonably curated clinical/lifestyle vocabulary works.
//! The defaults below cover the phrasing common in primary-care encounter
//! transcripts.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Thresholds and vocabularies for the semantic scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Cosine similarity at or above which a link is accepted outright
    pub accept_threshold: f64,

    /// Cosine similarity at or above which the lexical heuristic is
    /// consulted as a tie-breaker (below it the link is rejected)
    pub review_threshold: f64,

    /// Minimum shared-word ratio for the generic lexical overlap fallback
    pub overlap_ratio_threshold: f64,

    /// Clinical/medical vocabulary
    pub clinical_terms: Vec<String>,

    /// Lifestyle/social vocabulary
    pub lifestyle_terms: Vec<String>,

    /// Words excluded from the generic overlap computation
    pub stop_words: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.85,
            review_threshold: 0.70,
            overlap_ratio_threshold: 0.3,
            clinical_terms: default_clinical_terms(),
            lifestyle_terms: default_lifestyle_terms(),
            stop_words: default_stop_words(),
        }
    }
}

impl ScoringConfig {
    /// Validate thresholds.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.accept_threshold) {
            return Err(ConfigError::Invalid(
                "accept_threshold must be within [0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.review_threshold) {
            return Err(ConfigError::Invalid(
                "review_threshold must be within [0, 1]".to_string(),
            ));
        }
        if self.review_threshold > self.accept_threshold {
            return Err(ConfigError::Invalid(
                "review_threshold cannot exceed accept_threshold".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.overlap_ratio_threshold) {
            return Err(ConfigError::Invalid(
                "overlap_ratio_threshold must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_clinical_terms() -> Vec<String> {
    [
        "pain",
        "chest",
        "blood",
        "pressure",
        "medication",
        "dosage",
        "dose",
        "symptom",
        "diagnosis",
        "prescription",
        "metoprolol",
        "lisinopril",
        "metformin",
        "insulin",
        "statin",
        "aspirin",
        "hypertension",
        "diabetes",
        "cholesterol",
        "asthma",
        "allergy",
        "allergies",
        "fever",
        "cough",
        "nausea",
        "dizziness",
        "fatigue",
        "headache",
        "migraine",
        "infection",
        "antibiotic",
        "cardiac",
        "pulmonary",
        "renal",
        "hepatic",
        "thyroid",
        "anemia",
        "arrhythmia",
        "palpitations",
        "shortness",
        "breath",
        "swelling",
        "edema",
        "rash",
        "lesion",
        "biopsy",
        "referral",
        "labs",
        "bloodwork",
        "glucose",
        "a1c",
        "ekg",
        "xray",
        "mri",
        "vaccination",
        "immunization",
        "injury",
        "fracture",
        "sprain",
        "surgery",
        "procedure",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_lifestyle_terms() -> Vec<String> {
    [
        "wine",
        "beer",
        "alcohol",
        "drinks",
        "drinking",
        "smoking",
        "smoke",
        "cigarettes",
        "tobacco",
        "vaping",
        "exercise",
        "running",
        "walking",
        "gym",
        "diet",
        "vegetarian",
        "vegan",
        "caffeine",
        "coffee",
        "sleep",
        "insomnia",
        "stress",
        "work",
        "job",
        "travel",
        "vacation",
        "hobby",
        "hobbies",
        "family",
        "marriage",
        "divorce",
        "retirement",
        "recreational",
        "marijuana",
        "cannabis",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_stop_words() -> Vec<String> {
    [
        "the", "and", "that", "this", "with", "from", "have", "has", "had", "was", "were", "been",
        "being", "about", "there", "their", "they", "them", "then", "than", "what", "when",
        "which", "would", "could", "should", "will", "your", "patient", "doctor", "says", "said",
        "reports", "reported", "noted", "also", "some", "very", "more", "most", "just", "like",
        "into", "over", "under", "because",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.clinical_terms.iter().any(|t| t == "metoprolol"));
        assert!(config.lifestyle_terms.iter().any(|t| t == "wine"));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = ScoringConfig {
            accept_threshold: 0.6,
            review_threshold: 0.7,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let config = ScoringConfig {
            accept_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
