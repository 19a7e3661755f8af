//! FARIS Storage Layer
//!
//! Implements the external collaborators of the analysis engine:
//!
//! - [`PatternStore`]: the `SimilarityStore`, an embedding model plus an HNSW
//!   index over past failure patterns
//! - [`SqliteCaseStore`]: the `CaseSink`, SQLite persistence of finished
//!   results with listing and statistics
//!
//! The pattern index is in-memory and rebuildable from the case database.
//!
//! # Examples
//!
//! ```no_run
//! use faris_store::{MockEmbeddingModel, PatternStore, SqliteCaseStore};
//!
//! let cases = SqliteCaseStore::new("faris.db").unwrap();
//! let patterns = PatternStore::load(MockEmbeddingModel::default(), cases.patterns().unwrap()).unwrap();
//! println!("{} known failure patterns", patterns.len());
//! ```

#![warn(missing_docs)]

pub mod embedding;
pub mod vector_index;

mod case_store;
mod pattern_store;

use thiserror::Error;

pub use case_store::{CaseStats, CaseSummary, SqliteCaseStore};
pub use embedding::{EmbeddingError, EmbeddingModel, MockEmbeddingModel};
pub use pattern_store::PatternStore;
pub use vector_index::{VectorIndex, VectorIndexError};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored or supplied data could not be interpreted
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Result (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Vector index operation failed
    #[error("Vector index error: {0}")]
    Index(#[from] VectorIndexError),

    /// A lock was poisoned by a panicking thread
    #[error("Store lock poisoned")]
    LockPoisoned,
}
