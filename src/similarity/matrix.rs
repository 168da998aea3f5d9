// SimilarityMatrix: rows are target (job description) skills, columns are
// candidate (resume) skills, cells are cosine similarities.
//
// Built once per analysis and read-only afterwards. Classification, top-K
// queries and scoring all read from it.

use serde::Serialize;
use tracing::debug;

use super::cosine::cosine_similarity;
use crate::error::{Result, SkillGapError};
use crate::skills::SkillSet;
use crate::vectorize::{Vector, VectorPair};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    targets: Vec<String>,
    candidates: Vec<String>,
    scores: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Compute the matrix for two skill sets from their vectors.
    pub fn compute(targets: &SkillSet, candidates: &SkillSet, vectors: &VectorPair) -> Result<Self> {
        Self::from_vectors(
            targets.to_strings(),
            candidates.to_strings(),
            &vectors.targets,
            &vectors.candidates,
        )
    }

    /// Compute the matrix from named vectors.
    ///
    /// Every vector must share one dimensionality, and there must be exactly
    /// one vector per name.
    pub fn from_vectors(
        targets: Vec<String>,
        candidates: Vec<String>,
        target_vectors: &[Vector],
        candidate_vectors: &[Vector],
    ) -> Result<Self> {
        if target_vectors.len() != targets.len() {
            return Err(SkillGapError::Vectorization(format!(
                "{} target vectors for {} target skills",
                target_vectors.len(),
                targets.len()
            )));
        }
        if candidate_vectors.len() != candidates.len() {
            return Err(SkillGapError::Vectorization(format!(
                "{} candidate vectors for {} candidate skills",
                candidate_vectors.len(),
                candidates.len()
            )));
        }

        // Check the whole space up front so a mismatch is reported even when
        // one side is a single vector.
        if let Some(expected) = target_vectors
            .iter()
            .chain(candidate_vectors.iter())
            .map(|v| v.len())
            .next()
        {
            if let Some(bad) = target_vectors
                .iter()
                .chain(candidate_vectors.iter())
                .find(|v| v.len() != expected)
            {
                return Err(SkillGapError::DimensionMismatch {
                    expected,
                    actual: bad.len(),
                });
            }
        }

        let scores = target_vectors
            .iter()
            .map(|t| {
                candidate_vectors
                    .iter()
                    .map(|c| cosine_similarity(t, c))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        debug!(
            rows = targets.len(),
            cols = candidates.len(),
            "Similarity matrix computed"
        );

        Ok(Self {
            targets,
            candidates,
            scores,
        })
    }

    /// Build a matrix from precomputed scores (e.g. loaded from an export).
    pub fn from_scores(
        targets: Vec<String>,
        candidates: Vec<String>,
        scores: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if scores.len() != targets.len() {
            return Err(SkillGapError::DimensionMismatch {
                expected: targets.len(),
                actual: scores.len(),
            });
        }
        if let Some(row) = scores.iter().find(|r| r.len() != candidates.len()) {
            return Err(SkillGapError::DimensionMismatch {
                expected: candidates.len(),
                actual: row.len(),
            });
        }
        Ok(Self {
            targets,
            candidates,
            scores,
        })
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.scores
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.scores.get(i).map(|r| r.as_slice())
    }

    pub fn score(&self, target: usize, candidate: usize) -> Option<f64> {
        self.scores.get(target)?.get(candidate).copied()
    }

    /// Row index of a target skill.
    pub fn row_index(&self, skill: &str) -> Option<usize> {
        self.targets.iter().position(|t| t == skill)
    }

    /// Row of a target skill by name.
    pub fn row_of(&self, skill: &str) -> Result<&[f64]> {
        self.row_index(skill)
            .and_then(|i| self.row(i))
            .ok_or_else(|| SkillGapError::UnknownSkill(skill.to_string()))
    }

    /// Best candidate for a row: (column, score). Ties go to the earliest column.
    pub fn row_max(&self, i: usize) -> Option<(usize, f64)> {
        row_argmax(self.row(i)?)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Render as CSV: header row is an empty cell followed by candidate skills,
    /// then one row per target skill.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();

        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.candidates.iter().map(|c| csv_field(c)))
            .collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for (target, row) in self.targets.iter().zip(&self.scores) {
            let cells: Vec<String> = std::iter::once(csv_field(target))
                .chain(row.iter().map(|s| s.to_string()))
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }

        out
    }
}

/// First index holding the maximum value, or None for an empty row.
pub(crate) fn row_argmax(row: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (j, &s) in row.iter().enumerate() {
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((j, s)),
        }
    }
    best
}

/// Quote a CSV field if it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
