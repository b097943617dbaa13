//! tracelink command line interface
//!
//! Thin wrapper around the pipeline: read the two texts, run alignment,
//! print the validated linking map as JSON on stdout. Rendering and
//! persistence belong to whatever consumes that JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use tracelink_config::Config;
use tracelink_core::EncounterContext;
use tracelink_llm::{
    create_alignment_provider, create_embedding_provider, CachingEmbeddingClient, EmbeddingCache,
};
use tracelink_pipeline::{AlignmentOutcome, AlignmentPipeline, SemanticScorer};

const DEFAULT_SYSTEM_PROMPT: &str = "\
You align AI-generated clinical summaries with the conversation transcripts \
they were derived from. You receive a JSON object with two arrays: \
`transcript_turns` and `summary_blocks`, both zero-indexed. For each summary \
block, identify every transcript turn that supports it. Respond with a JSON \
object of the form {\"linking_map\": [{\"summary_index\": <int>, \
\"transcript_indices\": [<int>, ...]}]}. Use only indices that appear in the \
input arrays. Omit summary blocks with no supporting turns.";

#[derive(Parser)]
#[command(name = "tracelink")]
#[command(about = "Evidence alignment between clinical transcripts and AI summaries")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align a transcript with a summary and print the linking map
    Align {
        /// Path to the raw transcript text file
        #[arg(long)]
        transcript: PathBuf,

        /// Path to the summary markdown file
        #[arg(long)]
        summary: PathBuf,

        /// Annotate links with confidence scores
        #[arg(long)]
        score: bool,

        /// Patient identifier, used for log correlation only
        #[arg(long, default_value = "unknown")]
        patient_id: String,

        /// Encounter identifier, used for log correlation only
        #[arg(long, default_value = "unknown")]
        encounter_id: String,

        /// Override the built-in system prompt with this file's contents
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("tracelink={}", log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Align {
            transcript,
            summary,
            score,
            patient_id,
            encounter_id,
            prompt_file,
            pretty,
        } => {
            align(
                transcript,
                summary,
                score,
                patient_id,
                encounter_id,
                prompt_file,
                pretty,
            )
            .await
        }
    }
}

async fn align(
    transcript_path: PathBuf,
    summary_path: PathBuf,
    score: bool,
    patient_id: String,
    encounter_id: String,
    prompt_file: Option<PathBuf>,
    pretty: bool,
) -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let transcript = std::fs::read_to_string(&transcript_path)
        .with_context(|| format!("failed to read transcript: {}", transcript_path.display()))?;
    let summary = std::fs::read_to_string(&summary_path)
        .with_context(|| format!("failed to read summary: {}", summary_path.display()))?;

    let system_prompt = match prompt_file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read prompt file: {}", path.display()))?,
        None => DEFAULT_SYSTEM_PROMPT.to_string(),
    };

    let provider = create_alignment_provider(config.alignment.clone())
        .context("failed to create alignment provider")?;

    let pipeline = if score {
        let embedding_provider = create_embedding_provider(config.embedding.clone())
            .context("failed to create embedding provider")?;
        let client = Arc::new(CachingEmbeddingClient::new(
            embedding_provider,
            Arc::new(EmbeddingCache::new()),
        ));
        let scorer = SemanticScorer::with_embeddings(config.scoring.clone(), client);
        AlignmentPipeline::with_scorer(provider, scorer)
    } else {
        AlignmentPipeline::new(provider)
    };

    let context = EncounterContext::new(patient_id, encounter_id);
    let outcome = pipeline
        .run(&context, &transcript, &summary, &system_prompt)
        .await?;

    let linking_map = match outcome {
        AlignmentOutcome::Completed(run) => {
            info!(
                kept = run.validation.kept_entries,
                dropped = run.validation.dropped_entries,
                dropped_indices = run.validation.dropped_transcript_indices,
                total_ms = run.metrics.total_duration.as_millis() as u64,
                "Alignment finished"
            );
            run.linking_map
        }
        AlignmentOutcome::Empty {
            turn_count,
            block_count,
        } => {
            info!(
                turn_count,
                block_count, "Nothing to align, emitting empty map"
            );
            tracelink_core::LinkingMap::default()
        }
    };

    let output = if pretty {
        serde_json::to_string_pretty(&linking_map)?
    } else {
        serde_json::to_string(&linking_map)?
    };
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_command_parses() {
        let cli = Cli::try_parse_from([
            "tracelink",
            "align",
            "--transcript",
            "t.txt",
            "--summary",
            "s.md",
            "--score",
            "--patient-id",
            "p1",
        ])
        .unwrap();

        let Commands::Align {
            transcript,
            summary,
            score,
            patient_id,
            encounter_id,
            ..
        } = cli.command;
        assert_eq!(transcript, PathBuf::from("t.txt"));
        assert_eq!(summary, PathBuf::from("s.md"));
        assert!(score);
        assert_eq!(patient_id, "p1");
        assert_eq!(encounter_id, "unknown");
    }

    #[test]
    fn align_requires_both_files() {
        let result = Cli::try_parse_from(["tracelink", "align", "--transcript", "t.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn default_prompt_names_the_contract() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("linking_map"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("summary_index"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("transcript_indices"));
    }
}
