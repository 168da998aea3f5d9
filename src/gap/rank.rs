// Top-K ranking of candidate skills per target skill.
//
// Used for "closest resume skills for each job skill" reporting. Ordering is
// by score descending; equal scores keep candidate order, so the result is
// deterministic.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::similarity::SimilarityMatrix;

/// A candidate skill and its similarity to some target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub skill: String,
    /// Column of the candidate in the similarity matrix
    pub index: usize,
    pub score: f64,
}

/// The top-K candidates for one target skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMatches {
    pub skill: String,
    pub candidates: Vec<RankedCandidate>,
}

/// Indices and scores of the `k` highest cells in a row.
pub fn top_k_row(row: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
    // sort_by is stable, so ties (including -0.0 vs 0.0) stay in column order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(k);
    ranked
}

/// The `k` candidates most similar to `skill`.
///
/// Fails with `UnknownSkill` if `skill` is not a target in the matrix.
pub fn top_k(matrix: &SimilarityMatrix, skill: &str, k: usize) -> Result<Vec<RankedCandidate>> {
    let row = matrix.row_of(skill)?;
    Ok(ranked(matrix, row, k))
}

/// Top-K candidates for every target skill, in row order.
pub fn top_k_all(matrix: &SimilarityMatrix, k: usize) -> Vec<TopMatches> {
    matrix
        .targets()
        .iter()
        .zip(matrix.rows())
        .map(|(skill, row)| TopMatches {
            skill: skill.clone(),
            candidates: ranked(matrix, row, k),
        })
        .collect()
}

fn ranked(matrix: &SimilarityMatrix, row: &[f64], k: usize) -> Vec<RankedCandidate> {
    top_k_row(row, k)
        .into_iter()
        .map(|(index, score)| RankedCandidate {
            skill: matrix.candidates()[index].clone(),
            index,
            score,
        })
        .collect()
}
