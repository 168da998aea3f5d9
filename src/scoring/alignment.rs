// Alignment score: a single 0-100 number summarizing how well the resume
// covers the job description's skills.
//
// Two reductions are supported and callers must pick one:
//
//   MeanRowMax:      mean over target skills of their best similarity, × 100
//   WeightedBuckets: (matched + 0.5 × partial) / total × 100
//
// MeanRowMax rewards near-misses continuously; WeightedBuckets only sees the
// bucket each skill landed in, so it moves when thresholds move.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillGapError};
use crate::gap::GapClassification;

/// Weight of a partial match in the bucket-count policy.
const PARTIAL_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationPolicy {
    MeanRowMax,
    WeightedBuckets,
}

impl AggregationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationPolicy::MeanRowMax => "mean-row-max",
            AggregationPolicy::WeightedBuckets => "weighted-buckets",
        }
    }
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mean-row-max" => Ok(AggregationPolicy::MeanRowMax),
            "weighted-buckets" => Ok(AggregationPolicy::WeightedBuckets),
            other => Err(format!(
                "unknown aggregation policy '{other}' (expected mean-row-max or weighted-buckets)"
            )),
        }
    }
}

/// Compute the alignment percentage, rounded to 2 decimal places.
///
/// Fails with `EmptyInput` when there are no target skills.
pub fn alignment_score(classification: &GapClassification, policy: AggregationPolicy) -> Result<f64> {
    if classification.is_empty() {
        return Err(SkillGapError::empty(
            "no target skills to aggregate an alignment score over",
        ));
    }

    let total = classification.len() as f64;
    let raw = match policy {
        AggregationPolicy::MeanRowMax => {
            let sum: f64 = classification.gaps.iter().map(|g| g.score).sum();
            sum / total * 100.0
        }
        AggregationPolicy::WeightedBuckets => {
            let counts = classification.counts();
            (counts.matched as f64 + PARTIAL_WEIGHT * counts.partial as f64) / total * 100.0
        }
    };

    // Negative cosine maxima would pull the mean below zero
    Ok(round2(raw.clamp(0.0, 100.0)))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
