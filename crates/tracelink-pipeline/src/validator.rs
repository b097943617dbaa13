//! Bounds validation of the untrusted linking map
//!
//! Nothing past this module ever sees an out-of-range index. Violations
//! are counted for observability, never raised: a partially wrong map is
//! still useful, a rejected run is not.

use tracelink_core::{LinkEntry, LinkingMap, RawLinkingMap, ValidationReport};

/// Validate a raw linking map against the segment counts.
///
/// An entry survives iff its `summary_index` is a non-negative integer
/// below `summary_count`; floats, strings, nulls, and negatives all drop
/// the whole entry. Within a kept entry, only integer transcript indices
/// in range survive, deduplicated in first-seen order. Entries whose
/// transcript list validates down to empty are kept. Duplicate summary
/// indices across entries are preserved.
pub fn validate(
    raw: &RawLinkingMap,
    summary_count: usize,
    transcript_count: usize,
) -> (LinkingMap, ValidationReport) {
    let mut report = ValidationReport {
        raw_entries: raw.linking_map.len(),
        ..Default::default()
    };
    let mut entries = Vec::new();

    for raw_entry in &raw.linking_map {
        let summary_index = match raw_entry.summary_index.as_u64() {
            Some(index) if (index as usize) < summary_count => index as usize,
            _ => {
                report.dropped_entries += 1;
                continue;
            }
        };

        let mut transcript_indices: Vec<usize> = Vec::new();
        if let Some(values) = raw_entry.transcript_indices.as_array() {
            for value in values {
                match value.as_u64() {
                    Some(index) if (index as usize) < transcript_count => {
                        let index = index as usize;
                        if !transcript_indices.contains(&index) {
                            transcript_indices.push(index);
                        }
                    }
                    _ => report.dropped_transcript_indices += 1,
                }
            }
        }

        report.kept_entries += 1;
        entries.push(LinkEntry::new(summary_index, transcript_indices));
    }

    if report.dropped_entries > 0 || report.dropped_transcript_indices > 0 {
        tracing::warn!(
            dropped_entries = report.dropped_entries,
            dropped_transcript_indices = report.dropped_transcript_indices,
            "Linking map required sanitization"
        );
    }

    (LinkingMap::new(entries), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawLinkingMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_map_passes_unchanged() {
        let raw = raw(json!({
            "linking_map": [{"summary_index": 1, "transcript_indices": [0, 1]}]
        }));
        let (map, report) = validate(&raw, 2, 2);

        assert_eq!(map.entries, vec![LinkEntry::new(1, vec![0, 1])]);
        assert_eq!(report.raw_entries, 1);
        assert_eq!(report.kept_entries, 1);
        assert_eq!(report.dropped_entries, 0);
        assert_eq!(report.dropped_transcript_indices, 0);
    }

    #[test]
    fn out_of_range_summary_index_drops_entry() {
        let raw = raw(json!({
            "linking_map": [{"summary_index": 5, "transcript_indices": [0]}]
        }));
        let (map, report) = validate(&raw, 2, 2);

        assert!(map.is_empty());
        assert_eq!(report.dropped_entries, 1);
    }

    #[test]
    fn adversarial_summary_indices_drop_entries() {
        let raw = raw(json!({
            "linking_map": [
                {"summary_index": "zero", "transcript_indices": [0]},
                {"summary_index": 0.5, "transcript_indices": [0]},
                {"summary_index": null, "transcript_indices": [0]},
                {"summary_index": -1, "transcript_indices": [0]},
                {"transcript_indices": [0]}
            ]
        }));
        let (map, report) = validate(&raw, 10, 10);

        assert!(map.is_empty());
        assert_eq!(report.dropped_entries, 5);
    }

    #[test]
    fn invalid_transcript_indices_drop_silently() {
        let raw = raw(json!({
            "linking_map": [
                {"summary_index": 0, "transcript_indices": [0, 7, -1, "two", 1.5, null, 1]}
            ]
        }));
        let (map, report) = validate(&raw, 1, 2);

        assert_eq!(map.entries[0].transcript_indices, vec![0, 1]);
        assert_eq!(report.kept_entries, 1);
        assert_eq!(report.dropped_transcript_indices, 5);
    }

    #[test]
    fn empty_transcript_list_keeps_the_entry() {
        let raw = raw(json!({
            "linking_map": [{"summary_index": 0, "transcript_indices": [9, 10]}]
        }));
        let (map, report) = validate(&raw, 1, 2);

        assert_eq!(map.len(), 1);
        assert!(map.entries[0].transcript_indices.is_empty());
        assert_eq!(report.dropped_transcript_indices, 2);
    }

    #[test]
    fn non_array_transcript_list_becomes_empty() {
        let raw = raw(json!({
            "linking_map": [{"summary_index": 0, "transcript_indices": "all of them"}]
        }));
        let (map, _report) = validate(&raw, 1, 5);

        assert_eq!(map.len(), 1);
        assert!(map.entries[0].transcript_indices.is_empty());
    }

    #[test]
    fn duplicate_transcript_indices_deduplicate_in_order() {
        let raw = raw(json!({
            "linking_map": [{"summary_index": 0, "transcript_indices": [2, 0, 2, 1, 0]}]
        }));
        let (map, _report) = validate(&raw, 1, 3);

        assert_eq!(map.entries[0].transcript_indices, vec![2, 0, 1]);
    }

    #[test]
    fn duplicate_summary_indices_are_preserved() {
        let raw = raw(json!({
            "linking_map": [
                {"summary_index": 0, "transcript_indices": [0]},
                {"summary_index": 0, "transcript_indices": [1]}
            ]
        }));
        let (map, report) = validate(&raw, 1, 2);

        assert_eq!(map.len(), 2);
        assert_eq!(report.kept_entries, 2);
    }

    #[test]
    fn empty_raw_map_validates_to_empty() {
        let (map, report) = validate(&RawLinkingMap::default(), 3, 3);
        assert!(map.is_empty());
        assert_eq!(report.raw_entries, 0);
    }

    #[test]
    fn zero_counts_drop_everything() {
        let raw = raw(json!({
            "linking_map": [{"summary_index": 0, "transcript_indices": [0]}]
        }));
        let (map, report) = validate(&raw, 0, 0);
        assert!(map.is_empty());
        assert_eq!(report.dropped_entries, 1);
    }
}
