//! Content hashing for the embedding cache

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the exact text.
///
/// The hash is over the bytes as given; callers that want whitespace or
/// case folded into the key normalize before hashing.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
