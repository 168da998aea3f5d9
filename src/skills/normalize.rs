// Skill normalizer.
//
// Cleans raw skill strings (trim, collapse whitespace, lower-case), expands
// known abbreviations, and deduplicates while keeping the first occurrence.
// Deduplication runs after expansion, so "ML" and "machine learning" in the
// same list collapse to a single token.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SkillGapError};

/// Abbreviations every normalizer knows about out of the box.
const DEFAULT_ABBREVIATIONS: [(&str, &str); 3] = [
    ("ml", "machine learning"),
    ("dl", "deep learning"),
    ("ai", "artificial intelligence"),
];

/// Which document a skill set was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillSource {
    Resume,
    JobDescription,
}

impl SkillSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillSource::Resume => "resume",
            SkillSource::JobDescription => "job description",
        }
    }
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized skill: lower-cased, trimmed, abbreviation-expanded, non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillToken(String);

impl SkillToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SkillToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An ordered sequence of unique skill tokens from one document.
///
/// Only a [`Normalizer`] can build one, so the tokens are always clean,
/// unique and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSet {
    source: SkillSource,
    tokens: Vec<SkillToken>,
}

impl SkillSet {
    pub fn source(&self) -> SkillSource {
        self.source
    }

    pub fn tokens(&self) -> &[SkillToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillToken> {
        self.tokens.iter()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.tokens.iter().any(|t| t.as_str() == skill)
    }

    /// The tokens as plain strings, in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.0.clone()).collect()
    }
}

/// Turns raw skill strings into a [`SkillSet`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    abbreviations: HashMap<String, String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            abbreviations: DEFAULT_ABBREVIATIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Normalizer {
    /// A normalizer with no abbreviation table at all.
    pub fn without_abbreviations() -> Self {
        Self {
            abbreviations: HashMap::new(),
        }
    }

    /// Add (or replace) an abbreviation. Both sides are cleaned the same way
    /// skills are, so lookups stay exact-match on the cleaned token.
    pub fn with_abbreviation(mut self, short: &str, expanded: &str) -> Self {
        let short = clean(short);
        let expanded = clean(expanded);
        if !short.is_empty() && !expanded.is_empty() {
            self.abbreviations.insert(short, expanded);
        }
        self
    }

    /// Normalize a single raw skill. Returns `None` if nothing is left after trimming.
    pub fn normalize_one(&self, raw: &str) -> Option<SkillToken> {
        let cleaned = clean(raw);
        if cleaned.is_empty() {
            return None;
        }
        let expanded = self.abbreviations.get(&cleaned).cloned().unwrap_or(cleaned);
        Some(SkillToken(expanded))
    }

    /// Normalize a list of raw skills into a SkillSet.
    ///
    /// Fails with `EmptyInput` when no skill survives cleaning.
    pub fn normalize<S: AsRef<str>>(&self, source: SkillSource, raw: &[S]) -> Result<SkillSet> {
        let mut seen = HashSet::new();
        let mut tokens = Vec::with_capacity(raw.len());

        for token in raw.iter().filter_map(|s| self.normalize_one(s.as_ref())) {
            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        }

        if tokens.is_empty() {
            return Err(SkillGapError::empty(format!(
                "no {} skills supplied",
                source.as_str()
            )));
        }

        debug!(
            source = source.as_str(),
            raw = raw.len(),
            unique = tokens.len(),
            "Normalized skills"
        );

        Ok(SkillSet { source, tokens })
    }

    /// Re-run normalization over an existing set (a no-op for sets this
    /// normalizer produced).
    pub fn renormalize(&self, set: &SkillSet) -> Result<SkillSet> {
        self.normalize(set.source, &set.to_strings())
    }
}

/// Trim, collapse internal whitespace, lower-case.
fn clean(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split a plain-text skill list into raw entries.
///
/// Accepts one skill per line and/or comma- or semicolon-separated lists.
/// Blank entries are dropped; everything else is left for the normalizer.
pub fn parse_skill_list(text: &str) -> Vec<String> {
    text.split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
