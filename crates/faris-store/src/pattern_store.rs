//! In-memory similarity store of past failure patterns

use crate::embedding::{EmbeddingModel, MockEmbeddingModel};
use crate::vector_index::{VectorIndex, DEFAULT_EF_SEARCH};
use crate::StoreError;
use faris_domain::traits::{CollaboratorError, SimilarityStore};
use faris_domain::{FailurePattern, SimilarFailure};
use std::sync::RwLock;
use tracing::debug;

/// Append-only store of failure patterns searchable by embedding similarity
///
/// Patterns are embedded with `E` and indexed in an HNSW [`VectorIndex`];
/// the index key is the pattern's position in the append log.
pub struct PatternStore<E = MockEmbeddingModel> {
    model: E,
    index: VectorIndex,
    patterns: RwLock<Vec<FailurePattern>>,
    ef_search: usize,
}

impl PatternStore<MockEmbeddingModel> {
    /// Store backed by the hashed bag-of-words model
    pub fn with_mock_model() -> Self {
        Self::new(MockEmbeddingModel::default())
    }
}

impl<E: EmbeddingModel> PatternStore<E> {
    /// Create an empty store embedding with `model`
    pub fn new(model: E) -> Self {
        let index = VectorIndex::new(model.dimension());
        Self {
            model,
            index,
            patterns: RwLock::new(Vec::new()),
            ef_search: DEFAULT_EF_SEARCH,
        }
    }

    /// Build a store pre-loaded with `patterns`, e.g. from the case database
    pub fn load(model: E, patterns: impl IntoIterator<Item = FailurePattern>) -> Result<Self, StoreError> {
        let store = Self::new(model);
        for pattern in patterns {
            store.record(pattern)?;
        }
        debug!("Loaded {} failure patterns", store.len());
        Ok(store)
    }

    /// Number of recorded patterns
    pub fn len(&self) -> usize {
        self.patterns.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Whether no pattern is recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embed and index one pattern
    pub fn record(&self, pattern: FailurePattern) -> Result<(), StoreError> {
        let embedding = self.model.embed(&pattern.embedding_text())?;
        let mut patterns = self.patterns.write().map_err(|_| StoreError::LockPoisoned)?;
        let key = patterns.len() as u64;
        self.index.add(key, &embedding)?;
        patterns.push(pattern);
        Ok(())
    }

    /// Past failures nearest to `embedding`, most similar first
    pub fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<SimilarFailure>, StoreError> {
        let hits = self.index.search(embedding, k, self.ef_search)?;
        let patterns = self.patterns.read().map_err(|_| StoreError::LockPoisoned)?;

        Ok(hits
            .into_iter()
            .filter_map(|(key, similarity)| {
                patterns.get(key as usize).map(|p| SimilarFailure {
                    case_id: p.case_id,
                    failure_type: p.failure_type,
                    severity: p.severity,
                    description: p.description.clone(),
                    similarity: similarity.clamp(-1.0, 1.0),
                })
            })
            .collect())
    }
}

impl<E: EmbeddingModel> SimilarityStore for PatternStore<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        Ok(self.model.embed(text)?)
    }

    fn query_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<SimilarFailure>, CollaboratorError> {
        Ok(self.nearest(embedding, k)?)
    }

    fn append(&self, pattern: FailurePattern) -> Result<(), CollaboratorError> {
        Ok(self.record(pattern)?)
    }
}
