// Model download helper for the sentence embedding models.
//
// Fetches a sentence-transformer checkpoint (ONNX export + tokenizer) from
// Hugging Face into a platform-appropriate directory
// (~/.local/share/skillgap/models/<model>/ on Linux) so it persists across
// runs. This is the only network access in the crate and it happens before
// any analysis, never during one. The path helpers are always available;
// fetching needs the `embeddings` feature.

use std::path::{Path, PathBuf};

#[cfg(feature = "embeddings")]
use anyhow::{Context, Result};
#[cfg(feature = "embeddings")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "embeddings")]
use tracing::info;

use super::embeddings::EmbeddingModel;

/// Remote paths within the Hugging Face repo.
#[cfg(feature = "embeddings")]
const REMOTE_MODEL_FILE: &str = "onnx/model.onnx";
#[cfg(feature = "embeddings")]
const REMOTE_TOKENIZER_FILE: &str = "tokenizer.json";

/// Local file names inside a model directory.
const LOCAL_MODEL_FILE: &str = "model.onnx";
const LOCAL_TOKENIZER_FILE: &str = "tokenizer.json";

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/skillgap/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skillgap")
        .join("models")
}

/// Subdirectory of `base` holding one embedding model.
pub fn embedding_model_dir(base: &Path, model: EmbeddingModel) -> PathBuf {
    base.join(model.name())
}

/// Check whether both files `model` needs exist under `base`.
pub fn embedding_files_present(base: &Path, model: EmbeddingModel) -> bool {
    let dir = embedding_model_dir(base, model);
    dir.join(LOCAL_MODEL_FILE).exists() && dir.join(LOCAL_TOKENIZER_FILE).exists()
}

/// What [`download_model`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Directory the model now lives in
    pub dir: PathBuf,
    /// Files fetched by this call
    pub fetched: Vec<PathBuf>,
    /// Files that were already present and left alone
    pub skipped: Vec<PathBuf>,
}

/// Download `model` and its tokenizer under `base`.
///
/// Shows a progress bar for the model file. Skips files that already exist.
/// Creates directories as needed.
#[cfg(feature = "embeddings")]
pub async fn download_model(base: &Path, model: EmbeddingModel) -> Result<DownloadOutcome> {
    let dir = embedding_model_dir(base, model);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    let mut outcome = DownloadOutcome {
        dir: dir.clone(),
        fetched: Vec::new(),
        skipped: Vec::new(),
    };

    let repo = model.repo_url();
    for (remote, local, show_progress) in [
        (REMOTE_TOKENIZER_FILE, LOCAL_TOKENIZER_FILE, false),
        (REMOTE_MODEL_FILE, LOCAL_MODEL_FILE, true),
    ] {
        let dest = dir.join(local);
        if dest.exists() {
            info!(model = model.name(), file = local, "Already present, skipping");
            outcome.skipped.push(dest);
            continue;
        }
        download_file(&format!("{repo}/{remote}"), &dest, show_progress).await?;
        outcome.fetched.push(dest);
    }

    Ok(outcome)
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
#[cfg(feature = "embeddings")]
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        let pb = match response.content_length() {
            Some(size) => {
                let pb = ProgressBar::new(size);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                        .context("Invalid progress bar template")?
                        .progress_chars("=> "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("    {spinner} {bytes}")
                        .context("Invalid spinner template")?,
                );
                pb
            }
        };
        Some(pb)
    } else {
        None
    };

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    if let Some(ref pb) = pb {
        pb.set_position(bytes.len() as u64);
    }

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(url, dest = %dest.display(), bytes = bytes.len(), "Downloaded model file");
    Ok(())
}
