//! Error types for the Decomposer

use thiserror::Error;

/// Errors that can occur during decomposition
///
/// Only input problems are errors. Backend trouble is absorbed by the
/// sentence-split fallback and reported on the [`Decomposition`](crate::Decomposition).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecomposerError {
    /// Answer is empty or whitespace
    #[error("Answer is empty")]
    EmptyAnswer,

    /// Answer exceeds maximum length
    #[error("Answer too long: {0} chars (max: {1})")]
    AnswerTooLong(usize, usize),

    /// Backend response could not be interpreted
    #[error("Invalid decomposition format: {0}")]
    InvalidFormat(String),
}
