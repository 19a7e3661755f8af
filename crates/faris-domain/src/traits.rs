//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the analysis core and
//! infrastructure. Implementations live in other crates (faris-llm,
//! faris-store) or in the embedding application.

use crate::result::{AnalysisResult, FailurePattern, SimilarFailure};

/// Boxed error returned by shared, object-safe collaborators
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Decoding constraints for one completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConstraints {
    /// System prompt
    pub system: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of generated tokens
    pub max_tokens: u32,
    /// Request a JSON-only response
    pub json_output: bool,
}

impl Default for CompletionConstraints {
    fn default() -> Self {
        Self {
            system: None,
            temperature: 0.1,
            max_tokens: 1536,
            json_output: true,
        }
    }
}

impl CompletionConstraints {
    /// JSON output with the given system prompt
    pub fn json_with_system(system: &str) -> Self {
        Self {
            system: Some(system.to_string()),
            ..Self::default()
        }
    }

    /// Free-text output with the given temperature
    pub fn prose(temperature: f32, max_tokens: u32) -> Self {
        Self {
            system: None,
            temperature,
            max_tokens,
            json_output: false,
        }
    }
}

/// Text-generation backend used for semantic judgments
///
/// Implemented by the infrastructure layer (faris-llm). Calls are blocking;
/// async callers run them on the blocking pool under a timeout.
pub trait ReasoningBackend {
    /// Error type for backend operations
    type Error;

    /// Complete `prompt` under `constraints`
    fn complete(&self, prompt: &str, constraints: &CompletionConstraints) -> Result<String, Self::Error>;

    /// Name used in logs
    fn name(&self) -> &str {
        "reasoning-backend"
    }
}

/// Embedding and similar-past-failure retrieval
///
/// Implemented by the infrastructure layer (faris-store). Append-only and
/// key-independent, so concurrent requests need no coordination.
pub trait SimilarityStore: Send + Sync {
    /// Embed text into a vector
    fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;

    /// Up to `k` past failures nearest to `embedding`, most similar first
    fn query_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<SimilarFailure>, CollaboratorError>;

    /// Record a finished case's finding
    fn append(&self, pattern: FailurePattern) -> Result<(), CollaboratorError>;
}

/// Receiver of finished analysis results
///
/// Implemented by the infrastructure layer (faris-store).
pub trait CaseSink: Send + Sync {
    /// Persist one complete result
    fn store_result(&self, result: &AnalysisResult) -> Result<(), CollaboratorError>;
}
