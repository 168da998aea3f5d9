// Embedding cache: token -> vector, shared across analyses.
//
// Owned by an embedding vectorizer for the lifetime of its model. Reads take
// a shared lock; misses are computed outside the lock and inserted afterwards,
// so two analyses racing on the same token may both compute it. That is safe
// because encoding is deterministic: the second insert keeps the first value.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::Vector;

#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, Arc<Vector>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<Arc<Vector>> {
        self.entries.read().get(token).cloned()
    }

    /// Return the cached vector for `token`, computing and storing it on a miss.
    pub fn get_or_compute<F, E>(&self, token: &str, compute: F) -> Result<Arc<Vector>, E>
    where
        F: FnOnce(&str) -> Result<Vector, E>,
    {
        if let Some(hit) = self.get(token) {
            return Ok(hit);
        }
        let computed = Arc::new(compute(token)?);
        let mut entries = self.entries.write();
        Ok(entries
            .entry(token.to_string())
            .or_insert(computed)
            .clone())
    }

    /// Batch form of [`get_or_compute`](Self::get_or_compute).
    ///
    /// All misses are handed to `compute` in a single call (in input order),
    /// which must return exactly one vector per miss. Results come back in
    /// the order of `tokens`.
    pub fn get_or_compute_many<F, E>(&self, tokens: &[String], compute: F) -> Result<Vec<Arc<Vector>>, E>
    where
        F: FnOnce(&[String]) -> Result<Vec<Vector>, E>,
    {
        let mut found: Vec<Option<Arc<Vector>>> = {
            let entries = self.entries.read();
            tokens.iter().map(|t| entries.get(t).cloned()).collect()
        };

        let misses: Vec<String> = tokens
            .iter()
            .zip(&found)
            .filter(|(_, hit)| hit.is_none())
            .map(|(t, _)| t.clone())
            .collect();

        if !misses.is_empty() {
            debug!(
                hits = tokens.len() - misses.len(),
                misses = misses.len(),
                "Embedding cache lookup"
            );

            let computed = compute(&misses)?;
            let mut entries = self.entries.write();
            let mut fresh = misses.iter().zip(computed);
            for slot in found.iter_mut().filter(|s| s.is_none()) {
                if let Some((token, vector)) = fresh.next() {
                    let stored = entries
                        .entry(token.clone())
                        .or_insert_with(|| Arc::new(vector))
                        .clone();
                    *slot = Some(stored);
                }
            }
        }

        // Tokens a short compute result failed to cover are left out; callers check the length.
        Ok(found.into_iter().flatten().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
