use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;

use crate::vectorize::download;
use crate::vectorize::embeddings::EmbeddingModel;

/// Which vectorizer backend the CLI uses when `--vectorizer` is not given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorizerBackend {
    /// TF-IDF over the skill tokens (default): no model files needed
    TfIdf,
    /// Local ONNX sentence embeddings: requires `skillgap download-model`
    Embedding,
}

impl VectorizerBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorizerBackend::TfIdf => "tfidf",
            VectorizerBackend::Embedding => "embedding",
        }
    }
}

impl FromStr for VectorizerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tfidf" => Ok(VectorizerBackend::TfIdf),
            "embedding" => Ok(VectorizerBackend::Embedding),
            other => anyhow::bail!(
                "Unknown vectorizer '{other}'. Expected 'tfidf' or 'embedding'."
            ),
        }
    }
}

/// Process configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Analysis
/// thresholds and the aggregation policy are NOT configured here; they are
/// required per-run arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default vectorizer (SKILLGAP_VECTORIZER, default: tfidf)
    pub vectorizer: VectorizerBackend,
    /// Directory containing the ONNX model files (SKILLGAP_MODEL_DIR)
    pub model_dir: PathBuf,
    /// Sentence embedding checkpoint (SKILLGAP_EMBEDDING_MODEL, default: all-MiniLM-L6-v2)
    pub embedding_model: EmbeddingModel,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_values(
            env::var("SKILLGAP_VECTORIZER").ok().as_deref(),
            env::var("SKILLGAP_MODEL_DIR").ok().as_deref(),
            env::var("SKILLGAP_EMBEDDING_MODEL").ok().as_deref(),
        )
    }

    /// Build a configuration from raw values, applying defaults for unset ones.
    pub fn from_values(
        vectorizer: Option<&str>,
        model_dir: Option<&str>,
        embedding_model: Option<&str>,
    ) -> Result<Self> {
        let vectorizer = match vectorizer.map(str::trim) {
            None | Some("") => VectorizerBackend::TfIdf,
            Some(value) => value.parse()?,
        };

        let model_dir = model_dir
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(download::default_model_dir);

        let embedding_model = match embedding_model.map(str::trim) {
            None | Some("") => EmbeddingModel::default(),
            Some(value) => value.parse::<EmbeddingModel>().map_err(anyhow::Error::msg)?,
        };

        Ok(Self {
            vectorizer,
            model_dir,
            embedding_model,
        })
    }

    /// Directory holding the configured sentence embedding model.
    pub fn embedding_model_dir(&self) -> PathBuf {
        download::embedding_model_dir(&self.model_dir, self.embedding_model)
    }

    /// Validate that the embedding model is available.
    /// Call this before loading the embedding vectorizer.
    pub fn require_embedding_model(&self) -> Result<()> {
        if !download::embedding_files_present(&self.model_dir, self.embedding_model) {
            anyhow::bail!(
                "Embedding model {} not found in {}\n\
                 Run `skillgap download-model --model {}` to download it.\n\
                 Or use `--vectorizer tfidf`, which needs no model.",
                self.embedding_model,
                self.embedding_model_dir().display(),
                self.embedding_model
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_values(None, None, None).unwrap();
        assert_eq!(config.vectorizer, VectorizerBackend::TfIdf);
        assert_eq!(config.model_dir, download::default_model_dir());
        assert_eq!(config.embedding_model, EmbeddingModel::MiniLmL6V2);
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_values(Some("embedding"), Some("/opt/models"), None).unwrap();
        assert_eq!(config.vectorizer, VectorizerBackend::Embedding);
        assert_eq!(config.model_dir, PathBuf::from("/opt/models"));
        assert_eq!(
            config.embedding_model_dir(),
            PathBuf::from("/opt/models/all-MiniLM-L6-v2")
        );
    }

    #[test]
    fn test_unknown_vectorizer_rejected() {
        let err = Config::from_values(Some("bert"), None, None).unwrap_err();
        assert!(err.to_string().contains("Unknown vectorizer 'bert'"));
    }

    #[test]
    fn test_require_embedding_model_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            Config::from_values(Some("embedding"), dir.path().to_str(), None).unwrap();
        let err = config.require_embedding_model().unwrap_err();
        assert!(err.to_string().contains("download-model"));
    }

    #[test]
    fn test_embedding_model_selects_directory() {
        let config =
            Config::from_values(None, Some("/opt/models"), Some("paraphrase-MiniLM-L3-v2")).unwrap();
        assert_eq!(config.embedding_model, EmbeddingModel::ParaphraseMiniLmL3V2);
        assert_eq!(
            config.embedding_model_dir(),
            PathBuf::from("/opt/models/paraphrase-MiniLM-L3-v2")
        );

        let err = Config::from_values(None, None, Some("bert-base")).unwrap_err();
        assert!(err.to_string().contains("unknown embedding model"));
    }

    #[test]
    fn test_require_embedding_model_checks_selected_model() {
        let dir = tempfile::tempdir().unwrap();
        let l6 = download::embedding_model_dir(dir.path(), EmbeddingModel::MiniLmL6V2);
        std::fs::create_dir_all(&l6).unwrap();
        std::fs::write(l6.join("model.onnx"), b"fake").unwrap();
        std::fs::write(l6.join("tokenizer.json"), b"fake").unwrap();

        let base = dir.path().to_str();
        assert!(Config::from_values(None, base, None)
            .unwrap()
            .require_embedding_model()
            .is_ok());
        let err = Config::from_values(None, base, Some("paraphrase-MiniLM-L3-v2"))
            .unwrap()
            .require_embedding_model()
            .unwrap_err();
        assert!(err.to_string().contains("paraphrase-MiniLM-L3-v2"));
    }
}
