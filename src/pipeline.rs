// Analysis pipeline: wires the stages together for one resume/job pair.
//
//   raw skills -> Normalizer -> Vectorizer -> SimilarityMatrix
//              -> classify -> alignment score -> AlignmentReport
//
// Synchronous and side-effect free apart from the vectorizer's own cache.
// The matrix is kept on the result so thresholds or the aggregation policy
// can change without re-vectorizing.

use tracing::info;

use crate::error::Result;
use crate::gap::{classify, top_k_all, GapClassification, Thresholds};
use crate::recommend::CourseCatalog;
use crate::report::AlignmentReport;
use crate::scoring::AggregationPolicy;
use crate::similarity::SimilarityMatrix;
use crate::skills::{Normalizer, SkillSet, SkillSource};
use crate::vectorize::Vectorizer;

/// Caller-supplied engine configuration. Thresholds and policy are required.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub thresholds: Thresholds,
    pub policy: AggregationPolicy,
    /// When set, the report carries the top-K resume skills per job skill
    pub top_k: Option<usize>,
    /// When set, the report recommends courses for this many missing skills
    pub recommendations: Option<usize>,
}

impl AnalysisConfig {
    pub fn new(thresholds: Thresholds, policy: AggregationPolicy) -> Self {
        Self {
            thresholds,
            policy,
            top_k: None,
            recommendations: None,
        }
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn with_recommendations(mut self, limit: usize) -> Self {
        self.recommendations = Some(limit);
        self
    }
}

/// Everything one analysis produced.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub resume: SkillSet,
    pub job: SkillSet,
    pub matrix: SimilarityMatrix,
    pub classification: GapClassification,
    pub report: AlignmentReport,
}

impl Analysis {
    /// Re-run classification and aggregation on the cached matrix.
    pub fn reclassify(&self, config: &AnalysisConfig) -> Result<Self> {
        let (classification, report) = evaluate(&self.matrix, config)?;
        Ok(Self {
            resume: self.resume.clone(),
            job: self.job.clone(),
            matrix: self.matrix.clone(),
            classification,
            report,
        })
    }
}

/// Run a full analysis: job-description skills are the targets, resume
/// skills the candidates.
pub fn analyze<S: AsRef<str>>(
    resume_skills: &[S],
    job_skills: &[S],
    normalizer: &Normalizer,
    vectorizer: &dyn Vectorizer,
    config: &AnalysisConfig,
) -> Result<Analysis> {
    let resume = normalizer.normalize(SkillSource::Resume, resume_skills)?;
    let job = normalizer.normalize(SkillSource::JobDescription, job_skills)?;

    let vectors = vectorizer.vectorize(&job, &resume)?;
    let dim = vectors.dimension()?;
    let matrix = SimilarityMatrix::compute(&job, &resume, &vectors)?;

    let (classification, report) = evaluate(&matrix, config)?;

    info!(
        vectorizer = vectorizer.name(),
        resume_skills = resume.len(),
        job_skills = job.len(),
        dim = dim,
        matched = report.matched.len(),
        partial = report.partial.len(),
        missing = report.missing.len(),
        score = report.overall_score,
        "Skill gap analysis complete"
    );

    Ok(Analysis {
        resume,
        job,
        matrix,
        classification,
        report,
    })
}

fn evaluate(
    matrix: &SimilarityMatrix,
    config: &AnalysisConfig,
) -> Result<(GapClassification, AlignmentReport)> {
    let classification = classify(matrix, &config.thresholds);
    let top_matches = config.top_k.map(|k| top_k_all(matrix, k));
    let mut report = AlignmentReport::build(
        &classification,
        config.thresholds,
        config.policy,
        top_matches,
    )?;
    if let Some(limit) = config.recommendations {
        report = report.with_recommendations(&CourseCatalog::default(), limit);
    }
    Ok((classification, report))
}
