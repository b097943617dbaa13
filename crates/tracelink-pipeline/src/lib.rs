//! Orchestration layer for tracelink
//!
//! Validation of untrusted linking maps, explainable link scoring, and
//! the phased pipeline that ties segmentation, the alignment call,
//! validation, and scoring together.

pub mod alignment_pipeline;
pub mod scorer;
pub mod validator;

pub use alignment_pipeline::{AlignmentOutcome, AlignmentPipeline, AlignmentRun, PipelineMetrics};
pub use scorer::{LinkScore, SemanticScorer};
pub use validator::validate;
