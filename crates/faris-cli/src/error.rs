//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The analysis itself failed
    #[error("Analysis failed: {0}")]
    Analysis(#[from] faris_engine::AnalysisError),

    /// Case database error
    #[error("Store error: {0}")]
    Store(#[from] faris_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested case does not exist
    #[error("Case not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_domain::PipelineStage;
    use faris_engine::AnalysisError;

    #[test]
    fn test_analysis_error_message() {
        let err: CliError = AnalysisError::DeadlineExceeded(PipelineStage::Decomposing).into();
        assert_eq!(
            err.to_string(),
            "Analysis failed: Deadline exceeded during decomposing"
        );
    }
}
