// File export for external dashboards and reports.
//
// Two artifacts:
//   - the similarity matrix as CSV (rows = job skills, columns = resume skills)
//   - the gap document as JSON (`matched`, `partial`, `missing`)

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::report::AlignmentReport;
use crate::similarity::SimilarityMatrix;

/// Write the similarity matrix as CSV.
pub fn write_matrix_csv(matrix: &SimilarityMatrix, path: &Path) -> Result<()> {
    std::fs::write(path, matrix.to_csv())
        .with_context(|| format!("Failed to write similarity matrix to {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = matrix.targets().len(),
        cols = matrix.candidates().len(),
        "Exported similarity matrix"
    );
    Ok(())
}

/// Write the gap document (`matched` / `partial` / `missing`) as pretty JSON.
pub fn write_gap_json(report: &AlignmentReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&report.to_gap_document())
        .context("Failed to serialize gap report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write gap report to {}", path.display()))?;
    info!(path = %path.display(), "Exported gap report");
    Ok(())
}
