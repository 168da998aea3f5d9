// Threshold classifier.
//
// For each target skill, the row maximum of the similarity matrix decides
// the bucket:
//
//   max >= high         -> Matched
//   low <= max < high   -> Partial
//   max < low           -> Missing
//
// A row that is entirely zero (e.g. the target vector had zero norm) is
// Missing no matter where the thresholds sit. The best match is the column
// holding the row maximum, earliest column on ties.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SkillGapError};
use crate::similarity::matrix::row_argmax;
use crate::similarity::SimilarityMatrix;

/// A validated (high, low) threshold pair.
///
/// No `Default`: callers must choose thresholds explicitly. Deserializing
/// goes through the same validation as [`Thresholds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct Thresholds {
    high: f64,
    low: f64,
}

impl Thresholds {
    /// Requires `0 <= low < high <= 1`.
    pub fn new(high: f64, low: f64) -> Result<Self> {
        let in_range = |x: f64| (0.0..=1.0).contains(&x);
        if !in_range(high) || !in_range(low) || high <= low {
            return Err(SkillGapError::InvalidThresholds { high, low });
        }
        Ok(Self { high, low })
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    /// Bucket for a single best-match score.
    pub fn status_for(&self, score: f64) -> GapStatus {
        if score >= self.high {
            GapStatus::Matched
        } else if score >= self.low {
            GapStatus::Partial
        } else {
            GapStatus::Missing
        }
    }
}

#[derive(Deserialize)]
struct RawThresholds {
    high: f64,
    low: f64,
}

impl TryFrom<RawThresholds> for Thresholds {
    type Error = SkillGapError;

    fn try_from(raw: RawThresholds) -> Result<Self> {
        Thresholds::new(raw.high, raw.low)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapStatus {
    Matched,
    Partial,
    Missing,
}

impl GapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapStatus::Matched => "Matched",
            GapStatus::Partial => "Partial",
            GapStatus::Missing => "Missing",
        }
    }
}

impl fmt::Display for GapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of one target skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub status: GapStatus,
    /// Closest candidate skill; None when the row carries no signal at all
    pub best_match: Option<String>,
    /// Row maximum (0.0 for an all-zero or empty row)
    pub score: f64,
}

/// Bucket sizes. `matched + partial + missing == total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GapCounts {
    pub matched: usize,
    pub partial: usize,
    pub missing: usize,
    pub total: usize,
}

/// Classification of every target skill, in matrix row order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GapClassification {
    pub gaps: Vec<SkillGap>,
}

impl GapClassification {
    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn with_status(&self, status: GapStatus) -> impl Iterator<Item = &SkillGap> {
        self.gaps.iter().filter(move |g| g.status == status)
    }

    pub fn matched(&self) -> impl Iterator<Item = &SkillGap> {
        self.with_status(GapStatus::Matched)
    }

    pub fn partial(&self) -> impl Iterator<Item = &SkillGap> {
        self.with_status(GapStatus::Partial)
    }

    pub fn missing(&self) -> impl Iterator<Item = &SkillGap> {
        self.with_status(GapStatus::Missing)
    }

    pub fn counts(&self) -> GapCounts {
        let mut counts = GapCounts {
            total: self.gaps.len(),
            ..GapCounts::default()
        };
        for gap in &self.gaps {
            match gap.status {
                GapStatus::Matched => counts.matched += 1,
                GapStatus::Partial => counts.partial += 1,
                GapStatus::Missing => counts.missing += 1,
            }
        }
        counts
    }
}

/// Classify every target skill in the matrix.
pub fn classify(matrix: &SimilarityMatrix, thresholds: &Thresholds) -> GapClassification {
    let gaps: Vec<SkillGap> = matrix
        .targets()
        .iter()
        .zip(matrix.rows())
        .map(|(skill, row)| classify_row(skill, row, matrix.candidates(), thresholds))
        .collect();

    let classification = GapClassification { gaps };
    let counts = classification.counts();
    debug!(
        matched = counts.matched,
        partial = counts.partial,
        missing = counts.missing,
        high = thresholds.high,
        low = thresholds.low,
        "Classified target skills"
    );

    classification
}

fn classify_row(
    skill: &str,
    row: &[f64],
    candidates: &[String],
    thresholds: &Thresholds,
) -> SkillGap {
    let no_signal = row.iter().all(|&s| s == 0.0);

    match row_argmax(row) {
        Some((j, score)) if !no_signal => SkillGap {
            skill: skill.to_string(),
            status: thresholds.status_for(score),
            best_match: candidates.get(j).cloned(),
            score,
        },
        _ => SkillGap {
            skill: skill.to_string(),
            status: GapStatus::Missing,
            best_match: None,
            score: 0.0,
        },
    }
}
