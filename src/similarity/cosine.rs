// Cosine similarity between two vectors.
//
//   cos(u, v) = dot(u, v) / (|u| * |v|)
//
// A zero-norm vector has no direction, so any comparison involving one is
// defined as 0.0 rather than NaN. The result is clamped to [-1, 1] to absorb
// floating-point drift on near-parallel vectors.

use crate::error::{Result, SkillGapError};

/// Cosine similarity in [-1.0, 1.0]. Fails if the vectors differ in length.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(SkillGapError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom == 0.0 || !denom.is_finite() {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0))
}
