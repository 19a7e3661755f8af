//! Embedding Model for Failure Descriptions
//!
//! Turns finding descriptions into vectors so past failures can be found by
//! similarity. Models run locally; the store never makes network calls.
//!
//! # Architecture
//!
//! - **EmbeddingModel**: the trait the pattern store is generic over
//! - **MockEmbeddingModel**: hashed bag-of-words embeddings, deterministic
//!   and dependency-free, good enough to rank descriptions that share words
//!
//! # Examples
//!
//! ```rust
//! use faris_store::embedding::{cosine_similarity, EmbeddingModel, MockEmbeddingModel};
//!
//! let model = MockEmbeddingModel::new(256);
//! let a = model.embed("Claim states a fabricated dosage").unwrap();
//! let b = model.embed("fabricated dosage in the claim").unwrap();
//! let c = model.embed("Answer drifts off topic").unwrap();
//! assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Default embedding dimension
pub const DEFAULT_DIMENSION: usize = 256;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model inference error
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
}

/// Trait for embedding models
pub trait EmbeddingModel: Send + Sync {
    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Get the dimension of embeddings produced by this model
    fn dimension(&self) -> usize;
}

/// Hashed bag-of-words embedding model
///
/// Each lowercase word (and each adjacent word pair) is hashed to a bucket
/// and a sign; the bucket counts are normalized to unit length. Texts that
/// share vocabulary therefore land close together under cosine distance,
/// which is what "similar past failure" lookup needs.
///
/// - **Deterministic**: same text always produces the same embedding
/// - **Normalized**: all vectors have unit length
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dimension: usize,
}

impl MockEmbeddingModel {
    /// Create a new model producing `dimension`-sized vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let hash = hasher.finish();
        let index = (hash % self.dimension as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Default for MockEmbeddingModel {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1)
        .map(str::to_lowercase)
        .collect()
}

impl EmbeddingModel for MockEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let words = tokens(text);
        if words.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for word in &words {
            let (index, sign) = self.bucket(word);
            embedding[index] += sign;
        }
        // Word pairs weigh less than single words
        for pair in words.windows(2) {
            let (index, sign) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            embedding[index] += 0.5 * sign;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude == 0.0 {
            return Err(EmbeddingError::InferenceFailed(
                "Features cancelled out to a zero vector".to_string(),
            ));
        }
        for value in &mut embedding {
            *value /= magnitude;
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two vectors, 0.0 on length mismatch or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_embedding_deterministic() {
        let model = MockEmbeddingModel::new(128);
        let text = "Unsupported statistic attributed to a study";
        assert_eq!(model.embed(text).unwrap(), model.embed(text).unwrap());
    }

    #[test]
    fn test_mock_embedding_dimension() {
        let model = MockEmbeddingModel::new(64);
        assert_eq!(model.embed("test words").unwrap().len(), 64);
        assert_eq!(model.dimension(), 64);
    }

    #[test]
    fn test_mock_embedding_normalized() {
        let model = MockEmbeddingModel::default();
        let embedding = model.embed("absolute language without hedging").unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let model = MockEmbeddingModel::default();
        let a = model.embed("Circular reasoning detected").unwrap();
        let b = model.embed("circular REASONING detected!").unwrap();
        assert!(cosine_similarity(&a, &b) > 0.999);
    }

    #[test]
    fn test_shared_vocabulary_ranks_higher() {
        let model = MockEmbeddingModel::default();
        let query = model.embed("fabricated citation to a journal").unwrap();
        let near = model.embed("citation to a journal that does not exist").unwrap();
        let far = model.embed("answer gives unsolicited legal advice").unwrap();
        assert!(cosine_similarity(&query, &near) > cosine_similarity(&query, &far));
    }

    #[test]
    fn test_mock_embedding_empty_text() {
        let model = MockEmbeddingModel::default();
        assert!(model.embed("").is_err());
        assert!(model.embed(" ! ").unwrap_err().to_string().contains("Empty text"));
    }

    #[test]
    fn test_cosine_similarity_edges() {
        let x = vec![1.0, 0.0, 0.0];
        let y = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&x, &x) - 1.0).abs() < 0.0001);
        assert!(cosine_similarity(&x, &y).abs() < 0.0001);
        assert_eq!(cosine_similarity(&x, &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&x, &[0.0, 0.0, 0.0]), 0.0);
    }
}
