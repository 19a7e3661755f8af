//! Error types for detectors

use faris_llm::ReasonerError;
use std::time::Duration;
use thiserror::Error;

/// Why a detector produced no output
///
/// Every variant is recoverable: the orchestrator records a degradation
/// and treats the detector as having found nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// The reasoning backend failed
    #[error("Backend call failed: {0}")]
    Backend(String),

    /// The reasoning backend did not answer in time
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// The reasoning backend answered with unusable output
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

impl DetectorError {
    /// Whether the error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, DetectorError::Timeout(_))
    }
}

impl From<ReasonerError> for DetectorError {
    fn from(e: ReasonerError) -> Self {
        match e {
            ReasonerError::Timeout(after) => DetectorError::Timeout(after),
            ReasonerError::InvalidResponse(msg) => DetectorError::InvalidResponse(msg),
            other => DetectorError::Backend(other.to_string()),
        }
    }
}
