// Unit tests for alignment scoring and report assembly.
//
// Tests the aggregation policies in isolation: empty input, range
// invariants, rounding, and the JSON gap document shape.

use skillgap::gap::{classify, GapClassification, GapStatus, SkillGap, Thresholds};
use skillgap::report::AlignmentReport;
use skillgap::scoring::{alignment_score, AggregationPolicy};
use skillgap::similarity::SimilarityMatrix;
use skillgap::SkillGapError;

fn gap(skill: &str, status: GapStatus, best: Option<&str>, score: f64) -> SkillGap {
    SkillGap {
        skill: skill.to_string(),
        status,
        best_match: best.map(str::to_string),
        score,
    }
}

const POLICIES: [AggregationPolicy; 2] = [
    AggregationPolicy::MeanRowMax,
    AggregationPolicy::WeightedBuckets,
];

// ============================================================
// alignment_score: empty input and range
// ============================================================

#[test]
fn empty_targets_fail_for_every_policy() {
    for policy in POLICIES {
        let err = alignment_score(&GapClassification::default(), policy).unwrap_err();
        assert!(matches!(err, SkillGapError::EmptyInput { .. }));
    }
}

#[test]
fn empty_matrix_fails_at_aggregation() {
    let matrix = SimilarityMatrix::from_scores(vec![], vec!["python".to_string()], vec![]).unwrap();
    let classification = classify(&matrix, &Thresholds::new(0.75, 0.40).unwrap());
    assert!(classification.is_empty());
    assert!(AlignmentReport::build(
        &classification,
        Thresholds::new(0.75, 0.40).unwrap(),
        AggregationPolicy::MeanRowMax,
        None,
    )
    .is_err());
}

#[test]
fn all_matched_scores_one_hundred() {
    let classification = GapClassification {
        gaps: vec![
            gap("python", GapStatus::Matched, Some("python"), 1.0),
            gap("sql", GapStatus::Matched, Some("sql"), 1.0),
        ],
    };
    for policy in POLICIES {
        assert_eq!(alignment_score(&classification, policy).unwrap(), 100.0);
    }
}

#[test]
fn all_missing_scores_zero() {
    let classification = GapClassification {
        gaps: vec![
            gap("aws", GapStatus::Missing, None, 0.0),
            gap("go", GapStatus::Missing, None, 0.0),
        ],
    };
    for policy in POLICIES {
        assert_eq!(alignment_score(&classification, policy).unwrap(), 0.0);
    }
}

#[test]
fn negative_row_maxima_clamp_to_zero() {
    let classification = GapClassification {
        gaps: vec![gap("aws", GapStatus::Missing, Some("sql"), -0.4)],
    };
    let score = alignment_score(&classification, AggregationPolicy::MeanRowMax).unwrap();
    assert_eq!(score, 0.0);
}

#[test]
fn partials_count_half_in_weighted_buckets() {
    let classification = GapClassification {
        gaps: vec![
            gap("python", GapStatus::Matched, Some("python"), 0.9),
            gap("deep learning", GapStatus::Partial, Some("machine learning"), 0.5),
            gap("aws", GapStatus::Missing, None, 0.0),
        ],
    };
    // (1 + 0.5) / 3 * 100
    let score = alignment_score(&classification, AggregationPolicy::WeightedBuckets).unwrap();
    assert_eq!(score, 50.0);

    // (0.9 + 0.5 + 0.0) / 3 * 100 = 46.666...
    let score = alignment_score(&classification, AggregationPolicy::MeanRowMax).unwrap();
    assert_eq!(score, 46.67);
}

// ============================================================
// Policy names
// ============================================================

#[test]
fn policy_names_parse_back() {
    for policy in POLICIES {
        let parsed: AggregationPolicy = policy.as_str().parse().unwrap();
        assert_eq!(parsed, policy);
    }
    assert!("average".parse::<AggregationPolicy>().is_err());
}

// ============================================================
// AlignmentReport: gap document
// ============================================================

#[test]
fn gap_document_has_exactly_three_keys() {
    let classification = GapClassification {
        gaps: vec![
            gap("python", GapStatus::Matched, Some("python"), 1.0),
            gap("deep learning", GapStatus::Partial, Some("machine learning"), 0.5),
            gap("aws", GapStatus::Missing, None, 0.0),
        ],
    };
    let report = AlignmentReport::build(
        &classification,
        Thresholds::new(0.75, 0.40).unwrap(),
        AggregationPolicy::WeightedBuckets,
        None,
    )
    .unwrap();

    assert_eq!(report.total_targets(), 3);

    let doc = report.to_gap_document();
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3);
    assert_eq!(doc["matched"][0][0], "python");
    assert_eq!(doc["matched"][0][1], "python");
    assert_eq!(doc["partial"][0][1], "machine learning");
    assert_eq!(doc["partial"][0][2], 0.5);
    assert_eq!(doc["missing"], serde_json::json!(["aws"]));
}
