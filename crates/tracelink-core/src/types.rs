//! Domain types for transcript/summary alignment

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One speaker turn extracted from a raw transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    /// Zero-based position in the segmented transcript
    pub index: usize,
    /// Turn text, trimmed, with the leading dash marker stripped
    pub text: String,
}

/// One block extracted from a structured summary.
///
/// A block is a paragraph, a single list item, or a section header. Headers
/// are bold-wrapped lines (`**Medications**`) and are treated specially by
/// the scorer: they are structural, not evidence-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBlock {
    /// Zero-based position in the segmented summary
    pub index: usize,
    /// Block text, trimmed
    pub text: String,
    /// True when the entire block is a bold-wrapped header line
    pub is_header: bool,
}

/// Which side of the alignment a piece of text came from.
///
/// Partitions the embedding cache: the same sentence appearing as a summary
/// block and as a transcript turn is cached under two keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    SummaryBlock,
    TranscriptTurn,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::SummaryBlock => "summary_block",
            ContentKind::TranscriptTurn => "transcript_turn",
        }
    }
}

/// A validated link: one summary block backed by zero or more transcript
/// turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub summary_index: usize,
    pub transcript_indices: Vec<usize>,
    /// Per-transcript-index confidence, present only after scoring;
    /// parallel to `transcript_indices`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<Vec<f64>>,
}

impl LinkEntry {
    pub fn new(summary_index: usize, transcript_indices: Vec<usize>) -> Self {
        Self {
            summary_index,
            transcript_indices,
            confidence_scores: None,
        }
    }
}

/// The validated evidence map, serialized as `{"linking_map": [...]}`.
///
/// Entries whose transcript list validated down to empty are kept so that
/// consumers can distinguish "no evidence found" from "block never
/// mentioned". Duplicate summary indices are preserved as produced by the
/// model; see [`LinkingMap::dedup_last_wins`] for the consumer-side policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkingMap {
    #[serde(rename = "linking_map")]
    pub entries: Vec<LinkEntry>,
}

impl LinkingMap {
    pub fn new(entries: Vec<LinkEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Collapse duplicate summary indices, keeping the last occurrence.
    ///
    /// Consumers that persist one row per summary index use this before
    /// writing; the validator itself never drops duplicates. Output is
    /// ordered by summary index.
    pub fn dedup_last_wins(&self) -> LinkingMap {
        let mut by_index: std::collections::BTreeMap<usize, LinkEntry> =
            std::collections::BTreeMap::new();
        for entry in &self.entries {
            by_index.insert(entry.summary_index, entry.clone());
        }
        LinkingMap {
            entries: by_index.into_values().collect(),
        }
    }
}

/// Untrusted linking map exactly as the model returned it.
///
/// Indices are raw [`serde_json::Value`]s so that adversarial or confused
/// payloads (floats, strings, nulls, negative numbers, non-array lists)
/// deserialize without error and get dropped during validation instead of
/// aborting the run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLinkingMap {
    #[serde(default)]
    pub linking_map: Vec<RawLinkEntry>,
}

/// One untrusted entry of a [`RawLinkingMap`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawLinkEntry {
    #[serde(default)]
    pub summary_index: Value,
    #[serde(default)]
    pub transcript_indices: Value,
}

/// Opaque request-scoped identifiers carried for log correlation only.
///
/// Callers pass these explicitly with every run; nothing in the alignment
/// logic reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterContext {
    pub patient_id: String,
    pub encounter_id: String,
}

impl EncounterContext {
    pub fn new(patient_id: impl Into<String>, encounter_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            encounter_id: encounter_id.into(),
        }
    }
}

/// Counts produced by the validator, for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Entries in the raw map before validation
    pub raw_entries: usize,
    /// Entries kept (valid summary index)
    pub kept_entries: usize,
    /// Entries dropped (missing, non-integer, or out-of-range summary index)
    pub dropped_entries: usize,
    /// Transcript indices dropped from otherwise-kept entries
    pub dropped_transcript_indices: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn linking_map_serializes_under_wrapper_key() {
        let map = LinkingMap::new(vec![LinkEntry::new(0, vec![1, 2])]);
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(
            value,
            json!({"linking_map": [{"summary_index": 0, "transcript_indices": [1, 2]}]})
        );
    }

    #[test]
    fn confidence_scores_serialize_when_present() {
        let mut entry = LinkEntry::new(3, vec![5]);
        entry.confidence_scores = Some(vec![0.92]);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["confidence_scores"], json!([0.92]));
    }

    #[test]
    fn raw_map_accepts_adversarial_indices() {
        let raw: RawLinkingMap = serde_json::from_value(json!({
            "linking_map": [
                {"summary_index": "zero", "transcript_indices": [0]},
                {"summary_index": 1.5, "transcript_indices": "nope"},
                {"summary_index": -2},
                {"transcript_indices": [null, 3]}
            ]
        }))
        .unwrap();
        assert_eq!(raw.linking_map.len(), 4);
    }

    #[test]
    fn raw_map_tolerates_missing_wrapper_contents() {
        let raw: RawLinkingMap = serde_json::from_value(json!({})).unwrap();
        assert!(raw.linking_map.is_empty());
    }

    #[test]
    fn dedup_last_wins_keeps_final_entry_per_index() {
        let map = LinkingMap::new(vec![
            LinkEntry::new(0, vec![1]),
            LinkEntry::new(2, vec![4]),
            LinkEntry::new(0, vec![7, 8]),
        ]);
        let deduped = map.dedup_last_wins();
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped.entries[0].summary_index, 0);
        assert_eq!(deduped.entries[0].transcript_indices, vec![7, 8]);
        assert_eq!(deduped.entries[1].summary_index, 2);
    }
}
