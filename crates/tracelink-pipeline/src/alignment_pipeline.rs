//! Four-phase alignment pipeline
//!
//! 1. **Segment**: split transcript into turns and summary into blocks
//! 2. **Align**: one model call proposing the linking map
//! 3. **Validate**: bounds-check the untrusted map
//! 4. **Score**: optional per-link confidence annotation
//!
//! All state is request-scoped and passed explicitly; the only thing
//! shared across runs is the embedding cache inside the scorer's client.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use tracelink_core::{
    split_summary_into_blocks, split_transcript_into_turns, AlignmentProvider, AlignmentRequest,
    EncounterContext, LinkingMap, SummaryBlock, TranscriptTurn, ValidationReport,
};

use crate::scorer::SemanticScorer;
use crate::validator;

/// Metrics collected across the pipeline phases.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    /// Phase 1: segmentation time
    pub segment_duration: Duration,

    /// Phase 2: alignment model call time (includes retries)
    pub align_duration: Duration,

    /// Phase 3: validation time
    pub validate_duration: Duration,

    /// Phase 4: scoring time (zero when scoring is disabled)
    pub score_duration: Duration,

    /// Total pipeline time
    pub total_duration: Duration,

    /// Number of transcript turns after segmentation
    pub turn_count: usize,

    /// Number of summary blocks after segmentation
    pub block_count: usize,
}

/// Result of a completed alignment run.
#[derive(Debug, Clone)]
pub struct AlignmentRun {
    /// The validated (and optionally confidence-annotated) linking map
    pub linking_map: LinkingMap,

    /// Validation counts for observability
    pub validation: ValidationReport,

    /// Per-phase timings and segment counts
    pub metrics: PipelineMetrics,
}

/// Outcome of one pipeline run.
///
/// `Empty` means segmentation produced nothing to align on at least one
/// side; no model call was made. It is deliberately not an error, and
/// distinguishable from a transport failure.
#[derive(Debug, Clone)]
pub enum AlignmentOutcome {
    Empty { turn_count: usize, block_count: usize },
    Completed(AlignmentRun),
}

/// Orchestrates segment, align, validate, and score.
pub struct AlignmentPipeline {
    provider: Arc<dyn AlignmentProvider>,
    scorer: Option<SemanticScorer>,
}

impl AlignmentPipeline {
    /// Pipeline without confidence scoring.
    pub fn new(provider: Arc<dyn AlignmentProvider>) -> Self {
        Self {
            provider,
            scorer: None,
        }
    }

    /// Pipeline that annotates validated links with confidence scores.
    pub fn with_scorer(provider: Arc<dyn AlignmentProvider>, scorer: SemanticScorer) -> Self {
        Self {
            provider,
            scorer: Some(scorer),
        }
    }

    /// Run the full pipeline for one encounter.
    ///
    /// Alignment transport and response errors propagate; embedding
    /// failures inside the scorer degrade to the lexical fallback and do
    /// not fail the run.
    pub async fn run(
        &self,
        context: &EncounterContext,
        transcript: &str,
        summary: &str,
        system_prompt: &str,
    ) -> Result<AlignmentOutcome> {
        let start = Instant::now();
        let mut metrics = PipelineMetrics::default();

        info!(
            patient_id = %context.patient_id,
            encounter_id = %context.encounter_id,
            provider = self.provider.provider_name(),
            "Starting alignment run"
        );

        // Phase 1: segment both texts
        let (turns, blocks) = self.phase1_segment(transcript, summary, &mut metrics);

        if turns.is_empty() || blocks.is_empty() {
            info!(
                turn_count = turns.len(),
                block_count = blocks.len(),
                "Nothing to align, skipping model call"
            );
            return Ok(AlignmentOutcome::Empty {
                turn_count: turns.len(),
                block_count: blocks.len(),
            });
        }

        // Phase 2: propose links
        let raw = self
            .phase2_align(&turns, &blocks, system_prompt, &mut metrics)
            .await
            .context("alignment model call failed")?;

        // Phase 3: bounds validation
        let (mut linking_map, validation) =
            self.phase3_validate(&raw, blocks.len(), turns.len(), &mut metrics);

        // Phase 4: confidence annotation
        if let Some(scorer) = &self.scorer {
            self.phase4_score(scorer, &mut linking_map, &blocks, &turns, &mut metrics)
                .await;
        }

        metrics.total_duration = start.elapsed();
        info!(
            patient_id = %context.patient_id,
            encounter_id = %context.encounter_id,
            entries = linking_map.len(),
            dropped_entries = validation.dropped_entries,
            total_ms = metrics.total_duration.as_millis() as u64,
            "Alignment run complete"
        );

        Ok(AlignmentOutcome::Completed(AlignmentRun {
            linking_map,
            validation,
            metrics,
        }))
    }

    fn phase1_segment(
        &self,
        transcript: &str,
        summary: &str,
        metrics: &mut PipelineMetrics,
    ) -> (Vec<TranscriptTurn>, Vec<SummaryBlock>) {
        let start = Instant::now();

        let turns = split_transcript_into_turns(transcript);
        let blocks = split_summary_into_blocks(summary);

        metrics.segment_duration = start.elapsed();
        metrics.turn_count = turns.len();
        metrics.block_count = blocks.len();
        debug!(
            "Phase 1 complete in {:?} ({} turns, {} blocks)",
            metrics.segment_duration,
            turns.len(),
            blocks.len()
        );

        (turns, blocks)
    }

    async fn phase2_align(
        &self,
        turns: &[TranscriptTurn],
        blocks: &[SummaryBlock],
        system_prompt: &str,
        metrics: &mut PipelineMetrics,
    ) -> Result<tracelink_core::RawLinkingMap, tracelink_core::AlignmentError> {
        let start = Instant::now();

        let request = AlignmentRequest {
            system_prompt: system_prompt.to_string(),
            transcript_turns: turns.iter().map(|t| t.text.clone()).collect(),
            summary_blocks: blocks.iter().map(|b| b.text.clone()).collect(),
        };

        let result = self.provider.align(&request).await;

        metrics.align_duration = start.elapsed();
        debug!("Phase 2 complete in {:?}", metrics.align_duration);

        result
    }

    fn phase3_validate(
        &self,
        raw: &tracelink_core::RawLinkingMap,
        block_count: usize,
        turn_count: usize,
        metrics: &mut PipelineMetrics,
    ) -> (LinkingMap, ValidationReport) {
        let start = Instant::now();

        let (linking_map, report) = validator::validate(raw, block_count, turn_count);

        metrics.validate_duration = start.elapsed();
        debug!(
            "Phase 3 complete in {:?} ({} of {} entries kept)",
            metrics.validate_duration, report.kept_entries, report.raw_entries
        );

        (linking_map, report)
    }

    async fn phase4_score(
        &self,
        scorer: &SemanticScorer,
        linking_map: &mut LinkingMap,
        blocks: &[SummaryBlock],
        turns: &[TranscriptTurn],
        metrics: &mut PipelineMetrics,
    ) {
        let start = Instant::now();
        let mut scored_links = 0usize;

        for entry in &mut linking_map.entries {
            // Indices are in range: the validator ran first.
            let block = &blocks[entry.summary_index];
            let mut scores = Vec::with_capacity(entry.transcript_indices.len());
            for &turn_index in &entry.transcript_indices {
                let score = scorer.score_link(block, &turns[turn_index].text).await;
                scores.push(score.confidence);
                scored_links += 1;
            }
            entry.confidence_scores = Some(scores);
        }

        metrics.score_duration = start.elapsed();
        debug!(
            "Phase 4 complete in {:?} ({} links scored)",
            metrics.score_duration, scored_links
        );
    }
}
