// Sentence embedding vectorizer using a MiniLM sentence transformer.
//
// TF-IDF only sees shared characters: "pytorch" and "deep learning" score
// zero against each other. A sentence transformer places skills in a
// 384-dimensional semantic space where related skills land close together
// even when they share no words.
//
// Two checkpoints are supported: all-MiniLM-L6-v2 (default) and the smaller
// paraphrase-MiniLM-L3-v2. The model runs locally via ONNX, loaded once per
// process. Every skill
// token is encoded independently, so results are cached by token value.
// Mean pooling is applied to token embeddings (matching the model's training).

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::cache::EmbeddingCache;
use super::{ensure_non_empty, Vector, VectorPair, Vectorizer};
use crate::error::{Result, SkillGapError};
use crate::skills::SkillSet;

/// Sentence-transformer checkpoints the embedder can download and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmbeddingModel {
    /// all-MiniLM-L6-v2: 6 layers
    #[default]
    MiniLmL6V2,
    /// paraphrase-MiniLM-L3-v2: 3 layers, faster and slightly less accurate
    ParaphraseMiniLmL3V2,
}

impl EmbeddingModel {
    pub const ALL: [EmbeddingModel; 2] = [
        EmbeddingModel::MiniLmL6V2,
        EmbeddingModel::ParaphraseMiniLmL3V2,
    ];

    /// Hugging Face model name, also used as the local directory name.
    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingModel::MiniLmL6V2 => "all-MiniLM-L6-v2",
            EmbeddingModel::ParaphraseMiniLmL3V2 => "paraphrase-MiniLM-L3-v2",
        }
    }

    /// Width of the pooled sentence vector.
    pub fn dimension(&self) -> usize {
        match self {
            EmbeddingModel::MiniLmL6V2 => 384,
            EmbeddingModel::ParaphraseMiniLmL3V2 => 384,
        }
    }

    /// Base URL for raw files in the model's Hugging Face repo.
    pub fn repo_url(&self) -> String {
        format!(
            "https://huggingface.co/sentence-transformers/{}/resolve/main",
            self.name()
        )
    }

    /// Approximate size of the ONNX export, for download messages.
    pub fn approx_size_mb(&self) -> u32 {
        match self {
            EmbeddingModel::MiniLmL6V2 => 90,
            EmbeddingModel::ParaphraseMiniLmL3V2 => 70,
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EmbeddingModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EmbeddingModel::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = EmbeddingModel::ALL.iter().map(|m| m.name()).collect();
                format!("unknown embedding model '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Something that turns text into fixed-length dense vectors.
///
/// The ONNX sentence embedder is the production implementation; tests use
/// small deterministic encoders.
pub trait Encoder: Send + Sync {
    /// Length of every vector this encoder produces.
    fn dimension(&self) -> usize;

    /// Encode texts, returning one vector per text in the same order.
    fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vector>>;
}

/// Vectorizer that maps each skill token through an [`Encoder`], with a
/// token-keyed cache in front of it.
pub struct EmbeddingVectorizer<E: Encoder> {
    encoder: E,
    cache: EmbeddingCache,
}

impl<E: Encoder> EmbeddingVectorizer<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            cache: EmbeddingCache::new(),
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Embed every token in a skill set, encoding only cache misses.
    pub fn embed_set(&self, set: &SkillSet) -> Result<Vec<Vector>> {
        ensure_non_empty(set)?;

        let tokens = set.to_strings();
        let dim = self.encoder.dimension();

        let vectors = self.cache.get_or_compute_many(&tokens, |misses| {
            let encoded = self
                .encoder
                .encode_batch(misses)
                .map_err(|e| SkillGapError::Vectorization(format!("{e:#}")))?;
            if encoded.len() != misses.len() {
                return Err(SkillGapError::Vectorization(format!(
                    "encoder returned {} vectors for {} skills",
                    encoded.len(),
                    misses.len()
                )));
            }
            if let Some(bad) = encoded.iter().find(|v| v.len() != dim) {
                return Err(SkillGapError::DimensionMismatch {
                    expected: dim,
                    actual: bad.len(),
                });
            }
            Ok(encoded)
        })?;

        if vectors.len() != tokens.len() {
            return Err(SkillGapError::Vectorization(format!(
                "embedded {} of {} {} skills",
                vectors.len(),
                tokens.len(),
                set.source()
            )));
        }

        Ok(vectors.iter().map(|v| v.as_ref().clone()).collect())
    }
}

impl<E: Encoder> Vectorizer for EmbeddingVectorizer<E> {
    fn name(&self) -> &str {
        "embedding"
    }

    fn vectorize(&self, targets: &SkillSet, candidates: &SkillSet) -> Result<VectorPair> {
        let pair = VectorPair {
            targets: self.embed_set(targets)?,
            candidates: self.embed_set(candidates)?,
        };

        debug!(
            targets = pair.targets.len(),
            candidates = pair.candidates.len(),
            dim = self.encoder.dimension(),
            cached = self.cache.len(),
            "Computed skill embeddings"
        );

        Ok(pair)
    }
}

/// Mean pooling: average token embeddings weighted by the attention mask.
///
/// `hidden` is the flattened `[batch, seq_len, dim]` model output and `mask`
/// the flattened `[batch, seq_len]` attention mask. Rows whose mask is all
/// zero pool to the zero vector.
pub fn mean_pool(hidden: &[f32], mask: &[i64], batch: usize, seq_len: usize, dim: usize) -> Vec<Vector> {
    let mut pooled = Vec::with_capacity(batch);

    for i in 0..batch {
        let mut sum = vec![0.0_f64; dim];
        let mut mask_sum = 0.0_f64;

        for j in 0..seq_len {
            let mask_val = mask[i * seq_len + j] as f64;
            if mask_val > 0.0 {
                mask_sum += mask_val;
                let offset = (i * seq_len + j) * dim;
                for (k, acc) in sum.iter_mut().enumerate() {
                    *acc += hidden[offset + k] as f64 * mask_val;
                }
            }
        }

        if mask_sum > 0.0 {
            for val in &mut sum {
                *val /= mask_sum;
            }
        }

        pooled.push(sum);
    }

    pooled
}

#[cfg(feature = "embeddings")]
pub use onnx::SentenceEmbedder;

#[cfg(feature = "embeddings")]
mod onnx {
    use std::path::Path;

    use anyhow::{Context, Result};
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::debug;

    use super::{mean_pool, EmbeddingModel, Encoder};
    use crate::vectorize::Vector;

    /// Sentence embedder using a local ONNX model.
    ///
    /// `Session::run` takes `&mut self`, so the session sits behind a mutex.
    /// Inference is serialized; skill lists are short, so contention is minimal.
    pub struct SentenceEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        model: EmbeddingModel,
    }

    impl SentenceEmbedder {
        /// Load `model` and its tokenizer from the given directory.
        ///
        /// Expects `model.onnx` and `tokenizer.json` in the directory.
        /// Call `download::download_model()` first if they don't exist.
        pub fn load(model_dir: &Path, model: EmbeddingModel) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                anyhow::bail!(
                    "Embedding model not found: {}\nRun `skillgap download-model` to download it.",
                    model_path.display()
                );
            }
            if !tokenizer_path.exists() {
                anyhow::bail!(
                    "Embedding tokenizer not found: {}\nRun `skillgap download-model` to download it.",
                    tokenizer_path.display()
                );
            }

            let session = Session::builder()
                .context("Failed to create ONNX session builder")?
                .commit_from_file(&model_path)
                .with_context(|| {
                    format!(
                        "Failed to load embedding model from {}",
                        model_path.display()
                    )
                })?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {}", e))?;

            debug!(
                model = model.name(),
                "Loaded sentence embedding model from {}",
                model_dir.display()
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                model,
            })
        }

        pub fn model(&self) -> EmbeddingModel {
            self.model
        }
    }

    impl Encoder for SentenceEmbedder {
        fn dimension(&self) -> usize {
            self.model.dimension()
        }

        /// Tokenize, run the BERT model, and mean-pool each text to one vector.
        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let dim = self.model.dimension();

            let encodings: Vec<_> = texts
                .iter()
                .map(|t| {
                    self.tokenizer
                        .encode(t.as_str(), true)
                        .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
                })
                .collect::<Result<Vec<_>>>()?;

            let batch_size = encodings.len();
            let max_len = encodings
                .iter()
                .map(|e| e.get_ids().len())
                .max()
                .unwrap_or(0);

            if max_len == 0 {
                return Ok(vec![vec![0.0; dim]; batch_size]);
            }

            // BERT inputs, padded to the longest text:
            //   input_ids: token IDs (pad with 0)
            //   attention_mask: 1 for real tokens, 0 for padding
            //   token_type_ids: all zeros for single-sentence input
            let mut input_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);
            let mut attention_mask: Vec<i64> = Vec::with_capacity(batch_size * max_len);
            let mut token_type_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);

            for enc in &encodings {
                let ids = enc.get_ids();
                let pad_len = max_len - ids.len();

                input_ids.extend(ids.iter().map(|&id| id as i64));
                attention_mask.extend(enc.get_attention_mask().iter().map(|&m| m as i64));
                token_type_ids.extend(std::iter::repeat_n(0i64, ids.len()));

                input_ids.extend(std::iter::repeat_n(0i64, pad_len));
                attention_mask.extend(std::iter::repeat_n(0i64, pad_len));
                token_type_ids.extend(std::iter::repeat_n(0i64, pad_len));
            }

            let shape = [batch_size as i64, max_len as i64];

            let input_ids_tensor = Tensor::from_array((shape, input_ids))
                .context("Failed to create input_ids tensor")?;
            let attention_mask_tensor = Tensor::from_array((shape, attention_mask.clone()))
                .context("Failed to create attention_mask tensor")?;
            let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
                .context("Failed to create token_type_ids tensor")?;

            // Output is last_hidden_state: [batch, seq_len, dim]
            let hidden_states = {
                let mut session = self.session.lock();

                let outputs = session
                    .run(ort::inputs! {
                        "input_ids" => input_ids_tensor,
                        "attention_mask" => attention_mask_tensor,
                        "token_type_ids" => token_type_ids_tensor
                    })
                    .context("Embedding ONNX inference failed")?;

                let (_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract embedding output tensor")?;

                data.to_vec()
            };

            if hidden_states.len() != batch_size * max_len * dim {
                anyhow::bail!(
                    "Unexpected embedding output size {} for batch {}x{}",
                    hidden_states.len(),
                    batch_size,
                    max_len
                );
            }

            let embeddings = mean_pool(
                &hidden_states,
                &attention_mask,
                batch_size,
                max_len,
                dim,
            );

            debug!(
                batch_size = batch_size,
                dim = dim,
                "Computed sentence embeddings"
            );

            Ok(embeddings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{Normalizer, SkillSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Encodes each text as its letter histogram over a..e.
    struct LetterEncoder {
        calls: AtomicUsize,
    }

    impl Encoder for LetterEncoder {
        fn dimension(&self) -> usize {
            5
        }

        fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vector>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; 5];
                    for c in t.chars() {
                        if ('a'..='e').contains(&c) {
                            v[(c as u8 - b'a') as usize] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    struct BrokenEncoder;

    impl Encoder for BrokenEncoder {
        fn dimension(&self) -> usize {
            3
        }

        fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vector>> {
            Ok(texts.iter().map(|_| vec![1.0, 2.0]).collect())
        }
    }

    fn set(source: SkillSource, skills: &[&str]) -> SkillSet {
        Normalizer::default().normalize(source, skills).unwrap()
    }

    #[test]
    fn test_vectorize_uses_cache_across_runs() {
        let vectorizer = EmbeddingVectorizer::new(LetterEncoder {
            calls: AtomicUsize::new(0),
        });
        let jd = set(SkillSource::JobDescription, &["abc", "dead"]);
        let resume = set(SkillSource::Resume, &["abc", "bead"]);

        let first = vectorizer.vectorize(&jd, &resume).unwrap();
        assert_eq!(first.targets[0], vec![1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(first.candidates[1], vec![1.0, 1.0, 0.0, 1.0, 1.0]);
        assert_eq!(vectorizer.cache().len(), 3);

        let calls_after_first = vectorizer.encoder().calls.load(Ordering::SeqCst);
        let second = vectorizer.vectorize(&jd, &resume).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            vectorizer.encoder().calls.load(Ordering::SeqCst),
            calls_after_first,
            "second run should be served from the cache"
        );
    }

    #[test]
    fn test_wrong_dimension_is_rejected() {
        let vectorizer = EmbeddingVectorizer::new(BrokenEncoder);
        let jd = set(SkillSource::JobDescription, &["python"]);
        let resume = set(SkillSource::Resume, &["sql"]);
        let err = vectorizer.vectorize(&jd, &resume).unwrap_err();
        assert_eq!(
            err,
            SkillGapError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
        assert!(vectorizer.cache().is_empty());
    }

    #[test]
    fn test_embedding_model_names_parse() {
        for model in EmbeddingModel::ALL {
            assert_eq!(model.name().parse::<EmbeddingModel>().unwrap(), model);
            assert_eq!(model.dimension(), 384);
        }
        assert_eq!(
            "Paraphrase-MiniLM-L3-v2".parse::<EmbeddingModel>().unwrap(),
            EmbeddingModel::ParaphraseMiniLmL3V2
        );
        assert_eq!(EmbeddingModel::default(), EmbeddingModel::MiniLmL6V2);
        assert_eq!(
            EmbeddingModel::ParaphraseMiniLmL3V2.repo_url(),
            "https://huggingface.co/sentence-transformers/paraphrase-MiniLM-L3-v2/resolve/main"
        );

        let err = "bert-base".parse::<EmbeddingModel>().unwrap_err();
        assert!(err.contains("all-MiniLM-L6-v2"));
    }

    #[test]
    fn test_mean_pool_respects_mask() {
        // batch=1, seq_len=3, dim=2; third token is padding
        let hidden = [1.0_f32, 2.0, 3.0, 4.0, 100.0, 100.0];
        let mask = [1_i64, 1, 0];
        let pooled = mean_pool(&hidden, &mask, 1, 3, 2);
        assert_eq!(pooled, vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_mean_pool_all_padding_is_zero() {
        let hidden = [5.0_f32, 5.0];
        let mask = [0_i64];
        let pooled = mean_pool(&hidden, &mask, 1, 1, 2);
        assert_eq!(pooled, vec![vec![0.0, 0.0]]);
    }
}
