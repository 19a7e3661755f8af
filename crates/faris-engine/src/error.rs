//! Error types for the analysis engine

use faris_decomposer::DecomposerError;
use faris_domain::PipelineStage;
use thiserror::Error;

/// Errors that abort an analysis
///
/// Detector failures, backend timeouts, explainer fallbacks and store
/// failures are not errors: they are recorded as degradations on the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The answer could not be decomposed into claims
    #[error("Decomposition failed: {0}")]
    Decomposition(#[from] DecomposerError),

    /// No detector produced an output
    #[error("All {0} detectors failed")]
    AllDetectorsFailed(usize),

    /// The answer is not something that can be analysed
    #[error("Answer rejected: {0}")]
    Rejected(String),

    /// The request deadline expired before detection started
    #[error("Deadline exceeded during {0}")]
    DeadlineExceeded(PipelineStage),

    /// The request itself is malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Engine configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Stage the pipeline was in when the error occurred
    pub fn stage(&self) -> PipelineStage {
        match self {
            AnalysisError::Decomposition(_) => PipelineStage::Decomposing,
            AnalysisError::AllDetectorsFailed(_) => PipelineStage::Detecting,
            AnalysisError::DeadlineExceeded(stage) => *stage,
            AnalysisError::Rejected(_)
            | AnalysisError::InvalidRequest(_)
            | AnalysisError::Config(_) => PipelineStage::Received,
        }
    }
}
