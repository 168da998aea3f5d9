// Composition tests: verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   Normalizer -> Vectorizer -> SimilarityMatrix -> classify -> score -> report
// with both the TF-IDF backend and a deterministic in-memory encoder, without
// any model files or network calls (exports write to a tempdir).

use std::sync::atomic::{AtomicUsize, Ordering};

use skillgap::gap::{GapStatus, Thresholds};
use skillgap::output::export::{write_gap_json, write_matrix_csv};
use skillgap::scoring::AggregationPolicy;
use skillgap::skills::{parse_skill_list, Normalizer};
use skillgap::vectorize::embeddings::{EmbeddingVectorizer, Encoder};
use skillgap::vectorize::tfidf::{TfIdfVectorizer, VocabularyScope};
use skillgap::vectorize::Vector;
use skillgap::{analyze, AnalysisConfig, SkillGapError};

const RESUME: &str = "python\nsql\nmachine learning\ncommunication\ndata analysis\nnosql\n";
const JOB: &str = "Python, SQL, Deep Learning, AWS Cloud, Communication, Leadership";

fn config(policy: AggregationPolicy) -> AnalysisConfig {
    AnalysisConfig::new(Thresholds::new(0.75, 0.40).unwrap(), policy)
}

/// Letter-frequency encoder: deterministic, and skills sharing letters
/// land close together. Counts how many texts it was asked to encode.
#[derive(Default)]
struct LetterEncoder {
    encoded: AtomicUsize,
}

impl Encoder for LetterEncoder {
    fn dimension(&self) -> usize {
        26
    }

    fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vector>> {
        self.encoded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0; 26];
                for b in t.bytes().filter(u8::is_ascii_lowercase) {
                    v[(b - b'a') as usize] += 1.0;
                }
                v
            })
            .collect())
    }
}

// ============================================================
// Chain: skill files -> TF-IDF -> report
// ============================================================

#[test]
fn tfidf_pipeline_buckets_reference_lists() {
    let resume = parse_skill_list(RESUME);
    let job = parse_skill_list(JOB);

    let analysis = analyze(
        &resume,
        &job,
        &Normalizer::default(),
        &TfIdfVectorizer::default(),
        &config(AggregationPolicy::WeightedBuckets),
    )
    .unwrap();

    let report = &analysis.report;
    let matched: Vec<&str> = report.matched.iter().map(|m| m.skill.as_str()).collect();
    assert_eq!(matched, vec!["python", "sql", "communication"]);
    assert!(report.missing.contains(&"aws cloud".to_string()));
    assert!(report.missing.contains(&"leadership".to_string()));
    assert_eq!(report.total_targets(), 6);
    assert!((0.0..=100.0).contains(&report.overall_score));
    assert!(report.overall_score >= 50.0);
}

#[test]
fn both_vocabulary_scopes_agree_on_exact_matches() {
    let resume = parse_skill_list(RESUME);
    let job = parse_skill_list(JOB);

    for scope in [VocabularyScope::Joint, VocabularyScope::Independent] {
        let analysis = analyze(
            &resume,
            &job,
            &Normalizer::default(),
            &TfIdfVectorizer::new(scope),
            &config(AggregationPolicy::MeanRowMax),
        )
        .unwrap();

        let python = &analysis.classification.gaps[0];
        assert_eq!(python.skill, "python");
        assert_eq!(python.status, GapStatus::Matched);
        assert!((python.score - 1.0).abs() < 1e-9, "scope {scope:?}");
    }
}

#[test]
fn thresholds_change_without_revectorizing() {
    let analysis = analyze(
        &["python", "machine learning"],
        &["python", "deep learning"],
        &Normalizer::default(),
        &TfIdfVectorizer::default(),
        &config(AggregationPolicy::WeightedBuckets),
    )
    .unwrap();

    let lenient = AnalysisConfig::new(
        Thresholds::new(0.9, 0.01).unwrap(),
        AggregationPolicy::WeightedBuckets,
    );
    let again = analysis.reclassify(&lenient).unwrap();

    assert_eq!(again.matrix, analysis.matrix);
    assert_eq!(again.report.partial.len(), 1);
    assert_eq!(again.report.partial[0].best_match, "machine learning");
    assert_eq!(again.report.overall_score, 75.0);
}

#[test]
fn recommendations_cover_first_three_missing_skills() {
    let analysis = analyze(
        &["python"],
        &["python", "docker", "leadership", "aws", "tensorflow"],
        &Normalizer::default(),
        &TfIdfVectorizer::default(),
        &config(AggregationPolicy::WeightedBuckets).with_recommendations(3),
    )
    .unwrap();

    assert_eq!(analysis.report.missing.len(), 4);
    let recs = analysis.report.recommendations.as_ref().unwrap();
    let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Docker & Containers", "leadership", "AWS Cloud Services"]);
    assert_eq!(recs[1].action, "Learn leadership to match job requirements");

    let json = serde_json::to_value(&analysis.report).unwrap();
    assert_eq!(json["recommendations"][0]["skill"], "docker");
}

// ============================================================
// Chain: encoder -> cache -> report
// ============================================================

#[test]
fn embedding_pipeline_uses_cache_across_runs() {
    let vectorizer = EmbeddingVectorizer::new(LetterEncoder::default());
    let cfg = config(AggregationPolicy::MeanRowMax).with_top_k(2);

    let first = analyze(
        &["python", "sql"],
        &["python", "nosql"],
        &Normalizer::default(),
        &vectorizer,
        &cfg,
    )
    .unwrap();

    assert_eq!(first.report.matched[0].skill, "python");
    let top = first.report.top_matches.as_ref().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].candidates[0].skill, "sql");
    // python, nosql, sql: each encoded once
    assert_eq!(vectorizer.encoder().encoded.load(Ordering::SeqCst), 3);

    analyze(
        &["sql", "python"],
        &["nosql"],
        &Normalizer::default(),
        &vectorizer,
        &cfg,
    )
    .unwrap();
    assert_eq!(vectorizer.encoder().encoded.load(Ordering::SeqCst), 3);
    assert_eq!(vectorizer.cache().len(), 3);
}

#[test]
fn empty_job_list_is_rejected_before_vectorizing() {
    let vectorizer = EmbeddingVectorizer::new(LetterEncoder::default());
    let err = analyze(
        &["python"],
        &[" ", ""],
        &Normalizer::default(),
        &vectorizer,
        &config(AggregationPolicy::MeanRowMax),
    )
    .unwrap_err();

    assert!(matches!(err, SkillGapError::EmptyInput { .. }));
    assert_eq!(vectorizer.encoder().encoded.load(Ordering::SeqCst), 0);
}

// ============================================================
// Chain: analysis -> exports
// ============================================================

#[test]
fn exports_round_out_an_analysis() {
    let analysis = analyze(
        &["python", "sql"],
        &["python", "aws"],
        &Normalizer::default(),
        &TfIdfVectorizer::default(),
        &config(AggregationPolicy::WeightedBuckets),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("similarity_matrix.csv");
    let json_path = dir.path().join("skill_gap_report.json");
    write_matrix_csv(&analysis.matrix, &csv_path).unwrap();
    write_gap_json(&analysis.report, &json_path).unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(",python,sql"));
    assert!(lines.next().unwrap().starts_with("python,1,"));
    assert!(lines.next().unwrap().starts_with("aws,0,"));

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(doc["matched"][0][0], "python");
    assert_eq!(doc["missing"], serde_json::json!(["aws"]));
    assert_eq!(doc["partial"], serde_json::json!([]));
}
