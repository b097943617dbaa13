//! Cosine similarity between embedding vectors

use crate::error::EmbeddingError;

/// Cosine similarity between two vectors of equal length.
///
/// Returns a value in [-1, 1]. If either vector has zero magnitude the
/// result is exactly 0.0 rather than NaN: a zero vector carries no
/// direction to compare against. Vectors of different lengths come from
/// different models and are an error, never a silent 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
