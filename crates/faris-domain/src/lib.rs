//! FARIS Domain Layer
//!
//! Core data model for failure analysis of LLM answers. Everything here is
//! pure data plus the trait boundaries to external collaborators; the
//! orchestration, detection and scoring logic live in other crates.
//!
//! ## Key Concepts
//!
//! - **AnalysisRequest**: an immutable (question, answer, domain) triple
//! - **Claim**: an atomic, independently checkable assertion from the answer
//! - **FailureFinding**: one detector's evidence-backed failure judgment
//! - **RiskAssessment**: the deterministic score, level and interval
//! - **AnalysisResult**: the complete, serializable outcome of one request
//!
//! ## Collaborators
//!
//! - [`traits::ReasoningBackend`]: text completion for semantic judgments
//! - [`traits::SimilarityStore`]: embedding + similar-past-failure lookup
//! - [`traits::CaseSink`]: persistence of finished results

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod failure;
pub mod recommendation;
pub mod request;
pub mod result;
pub mod risk;
pub mod stage;
pub mod traits;

// Re-exports for convenience
pub use claim::{Claim, ClaimId, ClaimType, ClaimVerdict, Verdict};
pub use failure::{FailureFinding, FailureType, Severity};
pub use recommendation::{Priority, Recommendation, RecommendationType};
pub use request::{AnalysisRequest, CaseId, Domain, ModelMetadata};
pub use result::{
    AnalysisMetadata, AnalysisResult, AnswerKind, Degradation, Explanation, ExplanationSource,
    FailurePattern, SimilarFailure,
};
pub use risk::{ConfidenceInterval, RiskAssessment, RiskContribution, RiskLevel};
pub use stage::PipelineStage;
