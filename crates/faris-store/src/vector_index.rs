//! HNSW Vector Index for Similar-Failure Search
//!
//! Wraps the HNSW algorithm for nearest-neighbour search over pattern
//! embeddings. The index lives in memory and is rebuilt from the case
//! database on startup.
//!
//! # HNSW Parameters
//!
//! - **M**: bi-directional links per node (16)
//! - **efConstruction**: candidate list size while building (200)
//! - **efSearch**: candidate list size while searching, passed per query

use hnsw_rs::prelude::*;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const DEFAULT_MAX_ELEMENTS: usize = 100_000;

/// Default search quality parameter
pub const DEFAULT_EF_SEARCH: usize = 64;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Internal HNSW or lock error
    #[error("HNSW error: {0}")]
    Internal(String),
}

struct IndexState {
    hnsw: Hnsw<'static, f32, DistCosine>,
    /// Internal HNSW id -> caller key
    keys: HashMap<usize, u64>,
    next_id: usize,
}

impl IndexState {
    fn empty() -> Self {
        let nb_layer = 16.min((DEFAULT_MAX_ELEMENTS as f32).ln().trunc() as usize);
        Self {
            hnsw: Hnsw::<'static, f32, DistCosine>::new(
                DEFAULT_M,
                DEFAULT_MAX_ELEMENTS,
                nb_layer,
                DEFAULT_EF_CONSTRUCTION,
                DistCosine {},
            ),
            keys: HashMap::new(),
            next_id: 0,
        }
    }
}

/// Thread-safe HNSW index keyed by caller-chosen `u64` keys
///
/// # Examples
///
/// ```no_run
/// use faris_store::vector_index::VectorIndex;
///
/// let index = VectorIndex::new(3);
/// index.add(7, &[1.0, 0.0, 0.0]).unwrap();
/// let results = index.search(&[1.0, 0.0, 0.0], 1, 64).unwrap();
/// assert_eq!(results[0].0, 7);
/// ```
pub struct VectorIndex {
    dimension: usize,
    state: Mutex<IndexState>,
}

impl VectorIndex {
    /// Create a new vector index with the specified dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            state: Mutex::new(IndexState::empty()),
        }
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn state(&self) -> Result<MutexGuard<'_, IndexState>, VectorIndexError> {
        self.state
            .lock()
            .map_err(|_| VectorIndexError::Internal("index lock poisoned".to_string()))
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Add an embedding under `key`
    pub fn add(&self, key: u64, embedding: &[f32]) -> Result<(), VectorIndexError> {
        self.check_dimension(embedding)?;

        let mut state = self.state()?;
        let internal_id = state.next_id;
        state.next_id += 1;
        state.keys.insert(internal_id, key);

        let embedding_vec = embedding.to_vec();
        state.hnsw.insert((&embedding_vec, internal_id));

        Ok(())
    }

    /// The `k` nearest keys to `query` with their cosine similarity, most similar first
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(u64, f32)>, VectorIndexError> {
        self.check_dimension(query)?;

        let state = self.state()?;
        if k == 0 || state.keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<(u64, f32)> = state
            .hnsw
            .search(query, k, ef_search.max(k))
            .into_iter()
            .filter_map(|neighbour| {
                state
                    .keys
                    .get(&neighbour.d_id)
                    .map(|&key| (key, 1.0 - neighbour.distance))
            })
            .collect();
        results.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        results.truncate(k);

        Ok(results)
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        self.state().map(|s| s.keys.len()).unwrap_or(0)
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every vector
    pub fn clear(&self) -> Result<(), VectorIndexError> {
        *self.state()? = IndexState::empty();
        Ok(())
    }
}
