// TF-IDF vectorizer: the frequency-based strategy.
//
// Each skill token is treated as a tiny document. Terms are lower-case Unicode
// word runs of two or more characters, so single-letter skills like "c" produce
// an all-zero vector (and therefore never match anything).
//
// Weighting: raw term count × smoothed IDF, then each row is L2-normalized.
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//
// where n is the number of skill tokens the IDF was fit on and df(t) is how
// many of them contain t.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use stop_words::{get, LANGUAGE};
use tracing::debug;

use super::{ensure_non_empty, Vector, VectorPair, Vectorizer};
use crate::error::{Result, SkillGapError};
use crate::skills::SkillSet;

/// Where the vocabulary and IDF weights are fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VocabularyScope {
    /// Fit vocabulary and IDF over resume + job description together.
    /// A token's vector depends on everything else in the batch.
    #[default]
    Joint,
    /// Share the term axis (so vectors stay comparable) but fit IDF on each
    /// skill set separately.
    Independent,
}

/// TF-IDF vectorizer over skill tokens.
#[derive(Debug, Clone, Default)]
pub struct TfIdfVectorizer {
    pub scope: VocabularyScope,
    /// Drop English stop words ("and", "of", ...) before counting terms
    pub remove_stop_words: bool,
}

impl TfIdfVectorizer {
    pub fn new(scope: VocabularyScope) -> Self {
        Self {
            scope,
            remove_stop_words: false,
        }
    }

    pub fn with_stop_words(mut self, remove: bool) -> Self {
        self.remove_stop_words = remove;
        self
    }

    fn tokenizer(&self) -> TermTokenizer {
        if self.remove_stop_words {
            TermTokenizer::with_english_stop_words()
        } else {
            TermTokenizer::default()
        }
    }
}

impl Vectorizer for TfIdfVectorizer {
    fn name(&self) -> &str {
        match self.scope {
            VocabularyScope::Joint => "tfidf-joint",
            VocabularyScope::Independent => "tfidf-independent",
        }
    }

    fn vectorize(&self, targets: &SkillSet, candidates: &SkillSet) -> Result<VectorPair> {
        ensure_non_empty(targets)?;
        ensure_non_empty(candidates)?;

        let tokenizer = self.tokenizer();
        let target_docs = targets.to_strings();
        let candidate_docs = candidates.to_strings();

        let pair = match self.scope {
            VocabularyScope::Joint => {
                // Fit on the union, then project each side with the same model
                let all_docs: Vec<String> = candidate_docs
                    .iter()
                    .chain(target_docs.iter())
                    .cloned()
                    .collect();
                let model = TfIdfModel::fit(&all_docs, tokenizer)?;
                VectorPair {
                    targets: model.transform(&target_docs),
                    candidates: model.transform(&candidate_docs),
                }
            }
            VocabularyScope::Independent => {
                let all_docs: Vec<&String> =
                    candidate_docs.iter().chain(target_docs.iter()).collect();
                let vocabulary = Vocabulary::build(&tokenizer, all_docs)?;
                let target_model =
                    TfIdfModel::fit_with_vocabulary(&target_docs, vocabulary.clone(), tokenizer.clone());
                let candidate_model =
                    TfIdfModel::fit_with_vocabulary(&candidate_docs, vocabulary, tokenizer);
                VectorPair {
                    targets: target_model.transform(&target_docs),
                    candidates: candidate_model.transform(&candidate_docs),
                }
            }
        };

        debug!(
            vectorizer = self.name(),
            targets = pair.targets.len(),
            candidates = pair.candidates.len(),
            dim = pair.targets.first().map(|v| v.len()).unwrap_or(0),
            "TF-IDF vectors computed"
        );

        Ok(pair)
    }
}

/// Splits a skill token into terms.
#[derive(Debug, Clone, Default)]
pub struct TermTokenizer {
    stop_words: Option<HashSet<String>>,
}

impl TermTokenizer {
    pub fn with_english_stop_words() -> Self {
        let words: Vec<String> = get(LANGUAGE::English);
        Self {
            stop_words: Some(words.into_iter().collect()),
        }
    }

    pub fn terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        term_pattern()
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(move |t| match &self.stop_words {
                Some(stop) => !stop.contains(t),
                None => true,
            })
    }
}

fn term_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w{2,}").expect("valid term pattern"))
}

/// Sorted term axis shared by every vector a model produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Collect every term from the documents. Fails if there are none.
    pub fn build<I, S>(tokenizer: &TermTokenizer, docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for doc in docs {
            set.extend(tokenizer.terms(doc.as_ref()));
        }
        if set.is_empty() {
            return Err(SkillGapError::Vectorization(
                "no usable terms in skill tokens (empty vocabulary)".to_string(),
            ));
        }
        let terms: Vec<String> = set.into_iter().collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Ok(Self { terms, index })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }
}

/// A fitted TF-IDF model: vocabulary plus IDF weights.
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    tokenizer: TermTokenizer,
}

impl TfIdfModel {
    /// Fit vocabulary and IDF over the same documents.
    pub fn fit(docs: &[String], tokenizer: TermTokenizer) -> Result<Self> {
        if docs.is_empty() {
            return Err(SkillGapError::Vectorization(
                "cannot fit TF-IDF on zero documents".to_string(),
            ));
        }
        let vocabulary = Vocabulary::build(&tokenizer, docs)?;
        Ok(Self::fit_with_vocabulary(docs, vocabulary, tokenizer))
    }

    /// Fit IDF over `docs` against a vocabulary built elsewhere.
    pub fn fit_with_vocabulary(
        docs: &[String],
        vocabulary: Vocabulary,
        tokenizer: TermTokenizer,
    ) -> Self {
        let mut df = vec![0usize; vocabulary.len()];
        for doc in docs {
            let seen: HashSet<usize> = tokenizer
                .terms(doc)
                .filter_map(|t| vocabulary.get(&t))
                .collect();
            for i in seen {
                df[i] += 1;
            }
        }

        let n = docs.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        Self {
            vocabulary,
            idf,
            tokenizer,
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Project one document into the model's space (L2-normalized).
    pub fn transform_one(&self, doc: &str) -> Vector {
        let mut v = vec![0.0_f64; self.vocabulary.len()];
        for term in self.tokenizer.terms(doc) {
            if let Some(i) = self.vocabulary.get(&term) {
                v[i] += 1.0;
            }
        }
        for (x, idf) in v.iter_mut().zip(&self.idf) {
            *x *= idf;
        }
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }

    pub fn transform(&self, docs: &[String]) -> Vec<Vector> {
        docs.iter().map(|d| self.transform_one(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{Normalizer, SkillSource};

    fn sets(jd: &[&str], resume: &[&str]) -> (SkillSet, SkillSet) {
        let n = Normalizer::default();
        (
            n.normalize(SkillSource::JobDescription, jd).unwrap(),
            n.normalize(SkillSource::Resume, resume).unwrap(),
        )
    }

    #[test]
    fn test_terms_skip_single_characters() {
        let tok = TermTokenizer::default();
        let terms: Vec<String> = tok.terms("c r python3 ci/cd").collect();
        assert_eq!(terms, vec!["python3", "ci", "cd"]);
    }

    #[test]
    fn test_terms_cover_non_latin_scripts() {
        let tok = TermTokenizer::default();
        let terms: Vec<String> = tok.terms("数据分析 Машинное обучение c++").collect();
        assert_eq!(terms, vec!["数据分析", "машинное", "обучение"]);
    }

    #[test]
    fn test_stop_words_removed_when_enabled() {
        let tok = TermTokenizer::with_english_stop_words();
        let terms: Vec<String> = tok.terms("python and the sql").collect();
        assert_eq!(terms, vec!["python", "sql"]);
    }

    #[test]
    fn test_vocabulary_sorted_and_deduplicated() {
        let vocab = Vocabulary::build(
            &TermTokenizer::default(),
            ["sql", "nosql", "sql server"],
        )
        .unwrap();
        assert_eq!(vocab.terms(), &["nosql", "server", "sql"]);
        assert_eq!(vocab.get("sql"), Some(2));
    }

    #[test]
    fn test_empty_vocabulary_fails() {
        let err = Vocabulary::build(&TermTokenizer::default(), ["c", "r"]).unwrap_err();
        assert!(matches!(err, SkillGapError::Vectorization(_)));
    }

    #[test]
    fn test_smoothed_idf_values() {
        let docs = vec!["python".to_string(), "python sql".to_string()];
        let model = TfIdfModel::fit(&docs, TermTokenizer::default()).unwrap();
        // python: df=2 -> ln(3/3)+1 = 1; sql: df=1 -> ln(3/2)+1
        let p = model.vocabulary().get("python").unwrap();
        let s = model.vocabulary().get("sql").unwrap();
        assert!((model.idf()[p] - 1.0).abs() < 1e-12);
        assert!((model.idf()[s] - (1.5_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let docs = vec!["machine learning".to_string(), "deep learning".to_string()];
        let model = TfIdfModel::fit(&docs, TermTokenizer::default()).unwrap();
        for v in model.transform(&docs) {
            let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unknown_terms_give_zero_vector() {
        let docs = vec!["python".to_string()];
        let model = TfIdfModel::fit(&docs, TermTokenizer::default()).unwrap();
        assert!(model.transform_one("golang").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_joint_dimension_is_union_vocabulary() {
        let (jd, resume) = sets(&["deep learning", "aws cloud"], &["python", "sql"]);
        let pair = TfIdfVectorizer::default().vectorize(&jd, &resume).unwrap();
        assert_eq!(pair.targets.len(), 2);
        assert_eq!(pair.candidates.len(), 2);
        assert_eq!(pair.dimension().unwrap(), 6);
    }

    #[test]
    fn test_joint_is_deterministic() {
        let (jd, resume) = sets(&["python", "data analysis"], &["python", "data science"]);
        let v = TfIdfVectorizer::default();
        assert_eq!(v.vectorize(&jd, &resume).unwrap(), v.vectorize(&jd, &resume).unwrap());
    }

    #[test]
    fn test_independent_scope_shares_term_axis() {
        let (jd, resume) = sets(&["machine learning", "sql"], &["machine learning", "python"]);
        let pair = TfIdfVectorizer::new(VocabularyScope::Independent)
            .vectorize(&jd, &resume)
            .unwrap();
        assert_eq!(pair.dimension().unwrap(), 4);
    }

    #[test]
    fn test_name_reflects_scope() {
        assert_eq!(TfIdfVectorizer::default().name(), "tfidf-joint");
        assert_eq!(
            TfIdfVectorizer::new(VocabularyScope::Independent).name(),
            "tfidf-independent"
        );
    }
}
