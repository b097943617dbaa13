//! Segmentation of raw transcripts and structured summaries
//!
//! Pure text functions with no I/O. Malformed input never errors: the
//! worst case is an empty result (for empty input) or a single segment
//! holding the whole text (for a transcript with no delimiters).

use regex::Regex;
use std::sync::OnceLock;

use crate::types::{SummaryBlock, TranscriptTurn};

fn turn_delimiter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*-[ \t]*").expect("valid turn delimiter regex"))
}

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("valid paragraph break regex"))
}

fn bullet_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[-*]|\d+\.)[ \t]+").expect("valid bullet marker regex"))
}

fn header_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\*[^*]+\*\*$").expect("valid header regex"))
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split a raw transcript into speaker turns.
///
/// A turn boundary is a line whose first non-whitespace character is a dash
/// marker; the marker is stripped. Turns come back trimmed, non-empty, in
/// source order. Empty input yields an empty vec. Text with no dash marker
/// at all becomes one turn holding the whole trimmed text, so content is
/// never silently dropped.
pub fn split_transcript_into_turns(text: &str) -> Vec<TranscriptTurn> {
    let normalized = normalize_line_endings(text);

    turn_delimiter()
        .split(&normalized)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(index, segment)| TranscriptTurn {
            index,
            text: segment.to_string(),
        })
        .collect()
}

/// Split a structured summary into blocks.
///
/// Paragraphs are separated by blank lines. A paragraph whose first line
/// starts with a bullet marker (`-`, `*`, or `1.`) splits further into one
/// block per list item, with the marker stripped. `is_header` is set iff
/// the trimmed block is wrapped entirely in bold markers.
pub fn split_summary_into_blocks(text: &str) -> Vec<SummaryBlock> {
    let normalized = normalize_line_endings(text);

    let mut texts: Vec<String> = Vec::new();
    for paragraph in paragraph_break().split(&normalized) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if bullet_marker().is_match(paragraph) {
            for line in paragraph.lines() {
                let item = bullet_marker().replace(line.trim(), "");
                let item = item.trim();
                if !item.is_empty() {
                    texts.push(item.to_string());
                }
            }
        } else {
            texts.push(paragraph.to_string());
        }
    }

    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let is_header = header_pattern().is_match(&text);
            SummaryBlock {
                index,
                text,
                is_header,
            }
        })
        .collect()
}
