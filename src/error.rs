// Error taxonomy for the matching engine.
//
// Every failure inside the core is a local precondition failure: bad input,
// incompatible vectors, or an invalid threshold pair. Nothing here is
// retryable. The CLI and the model/export layers wrap these in anyhow.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkillGapError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkillGapError {
    /// No skills left after normalization, or nothing to aggregate.
    #[error("Empty input: {context}")]
    EmptyInput { context: String },

    /// The vectorizer was handed malformed or empty input, or its encoder failed.
    #[error("Vectorization failed: {0}")]
    Vectorization(String),

    /// Target and candidate vectors live in different spaces.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid thresholds: high={high}, low={low} (need 0 <= low < high <= 1)")]
    InvalidThresholds { high: f64, low: f64 },

    #[error("Skill not present in similarity matrix: {0}")]
    UnknownSkill(String),
}

impl SkillGapError {
    pub(crate) fn empty(context: impl Into<String>) -> Self {
        SkillGapError::EmptyInput {
            context: context.into(),
        }
    }
}
