// AlignmentReport: the terminal artifact of an analysis.
//
// Owned by the caller: the CLI renders it, exporters write it to disk, and
// dashboards consume the JSON gap document. The report is a pure function
// of the classification, so it is rebuilt whenever thresholds change.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::gap::{GapClassification, GapStatus, SkillGap, Thresholds, TopMatches};
use crate::recommend::{CourseCatalog, Recommendation};
use crate::scoring::{alignment_score, AggregationPolicy};

/// A target skill together with the candidate skill that covers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: String,
    pub best_match: String,
    pub score: f64,
}

impl SkillMatch {
    fn from_gap(gap: &SkillGap) -> Self {
        Self {
            skill: gap.skill.clone(),
            best_match: gap.best_match.clone().unwrap_or_default(),
            score: gap.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Alignment percentage, 0-100, 2 decimal places
    pub overall_score: f64,
    pub policy: AggregationPolicy,
    pub thresholds: Thresholds,
    pub matched: Vec<SkillMatch>,
    pub partial: Vec<SkillMatch>,
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_matches: Option<Vec<TopMatches>>,
    /// Upskilling suggestions for the first few missing skills
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
}

impl AlignmentReport {
    /// Aggregate a classification into a report.
    ///
    /// Fails with `EmptyInput` if the classification has no target skills.
    pub fn build(
        classification: &GapClassification,
        thresholds: Thresholds,
        policy: AggregationPolicy,
        top_matches: Option<Vec<TopMatches>>,
    ) -> Result<Self> {
        let overall_score = alignment_score(classification, policy)?;

        Ok(Self {
            overall_score,
            policy,
            thresholds,
            matched: classification.matched().map(SkillMatch::from_gap).collect(),
            partial: classification.partial().map(SkillMatch::from_gap).collect(),
            missing: classification
                .with_status(GapStatus::Missing)
                .map(|g| g.skill.clone())
                .collect(),
            top_matches,
            recommendations: None,
        })
    }

    /// Attach recommendations for the first `limit` missing skills.
    pub fn with_recommendations(mut self, catalog: &CourseCatalog, limit: usize) -> Self {
        self.recommendations = Some(catalog.recommend(&self.missing, limit));
        self
    }

    /// Number of target skills the report covers.
    pub fn total_targets(&self) -> usize {
        self.matched.len() + self.partial.len() + self.missing.len()
    }

    /// The interop gap document: `matched` and `partial` as
    /// `[skill, best_match, score]` triples, `missing` as skill names.
    pub fn to_gap_document(&self) -> Value {
        let triples = |items: &[SkillMatch]| -> Vec<Value> {
            items
                .iter()
                .map(|m| json!([m.skill, m.best_match, m.score]))
                .collect()
        };

        json!({
            "matched": triples(&self.matched),
            "partial": triples(&self.partial),
            "missing": self.missing,
        })
    }
}
