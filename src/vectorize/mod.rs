// Vectorizers: turn skill sets into comparable numeric vectors.
//
// Two interchangeable strategies share the Vectorizer trait: a TF-IDF model
// fit over the skill tokens themselves, and dense sentence embeddings from a
// local ONNX model. Vectors from different vectorizers are never compared.

pub mod cache;
pub mod download;
pub mod embeddings;
pub mod tfidf;

use crate::error::{Result, SkillGapError};
use crate::skills::SkillSet;

/// One skill's position in some vector space.
pub type Vector = Vec<f64>;

/// Vectors for both sides of one analysis, in SkillSet order.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorPair {
    pub targets: Vec<Vector>,
    pub candidates: Vec<Vector>,
}

impl VectorPair {
    /// Dimensionality shared by every vector in the pair.
    ///
    /// Fails with `DimensionMismatch` if any vector disagrees with the first.
    pub fn dimension(&self) -> Result<usize> {
        let mut all = self.targets.iter().chain(self.candidates.iter());
        let expected = match all.next() {
            Some(v) => v.len(),
            None => return Err(SkillGapError::empty("no vectors to compare")),
        };
        for v in all {
            if v.len() != expected {
                return Err(SkillGapError::DimensionMismatch {
                    expected,
                    actual: v.len(),
                });
            }
        }
        Ok(expected)
    }
}

/// Trait for mapping skill sets into vectors so backends can be swapped.
///
/// Both sets are passed together because the frequency variant fits its
/// vocabulary across them. Implementations must return exactly one vector
/// per token, in token order, all of equal length.
pub trait Vectorizer: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Vectorize job-description targets and resume candidates.
    fn vectorize(&self, targets: &SkillSet, candidates: &SkillSet) -> Result<VectorPair>;
}

/// Reject empty skill sets before doing any work.
pub(crate) fn ensure_non_empty(set: &SkillSet) -> Result<()> {
    if set.is_empty() {
        return Err(SkillGapError::Vectorization(format!(
            "empty {} skill set",
            set.source()
        )));
    }
    Ok(())
}
