//! Aggregation invariant violations

use faris_domain::{ClaimId, FailureType};
use thiserror::Error;

/// A structurally invalid finding
///
/// Violations never reach the caller of an analysis: the offending finding
/// is dropped, logged and counted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// Confidence is NaN, infinite or outside [0, 1]
    #[error("{failure_type} finding has confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange {
        /// Type of the offending finding
        failure_type: FailureType,
        /// The reported confidence
        confidence: f64,
    },

    /// Description is empty or whitespace
    #[error("{0} finding has an empty description")]
    EmptyDescription(FailureType),

    /// A claim id that the decomposition never produced
    #[error("{failure_type} finding references unknown claim {claim_id}")]
    UnknownClaim {
        /// Type of the offending finding
        failure_type: FailureType,
        /// The unknown id
        claim_id: ClaimId,
    },
}
