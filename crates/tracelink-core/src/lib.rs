//! Core domain layer for tracelink
//!
//! Everything that does not talk to the network lives here: the domain
//! types for transcript turns, summary blocks, and linking maps, the
//! segmentation functions that produce them, content hashing for the
//! embedding cache, cosine similarity, and the provider traits that the
//! outbound crates implement.

pub mod error;
pub mod hashing;
pub mod segment;
pub mod similarity;
pub mod traits;
pub mod types;

pub use error::{AlignmentError, EmbeddingError};
pub use hashing::content_hash;
pub use segment::{split_summary_into_blocks, split_transcript_into_turns};
pub use similarity::cosine_similarity;
pub use traits::{AlignmentProvider, AlignmentRequest, EmbeddingProvider};
pub use types::{
    ContentKind, EncounterContext, LinkEntry, LinkingMap, RawLinkEntry, RawLinkingMap,
    SummaryBlock, TranscriptTurn, ValidationReport,
};
