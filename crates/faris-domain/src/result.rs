//! The assembled analysis result and its parts

use crate::claim::Claim;
use crate::failure::{FailureFinding, FailureType, Severity};
use crate::recommendation::Recommendation;
use crate::request::{AnalysisRequest, CaseId};
use crate::risk::RiskAssessment;
use crate::stage::PipelineStage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where an explanation's prose came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationSource {
    /// Generated by the reasoning backend
    Backend,
    /// Built from the findings list without any external call
    Template,
}

/// A past failure similar to one in the current analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarFailure {
    /// Case the past failure belongs to
    pub case_id: CaseId,
    /// Failure type
    pub failure_type: FailureType,
    /// Severity recorded at the time
    pub severity: Severity,
    /// Description recorded at the time
    pub description: String,
    /// Cosine similarity to the query
    pub similarity: f32,
}

/// A finding recorded into the similarity store after an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePattern {
    /// Case the finding belongs to
    pub case_id: CaseId,
    /// Failure type
    pub failure_type: FailureType,
    /// Severity
    pub severity: Severity,
    /// Finding description
    pub description: String,
    /// Question the answer was given for
    pub question: String,
}

impl FailurePattern {
    /// Text that gets embedded for similarity search
    pub fn embedding_text(&self) -> String {
        format!("{}: {}", self.failure_type.as_str(), self.description)
    }
}

/// Human-readable narrative of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Short summary
    pub summary: String,
    /// Long-form analysis
    pub detailed_analysis: String,
    /// One line per notable finding
    #[serde(default)]
    pub key_findings: Vec<String>,
    /// Origin of the prose
    pub source: ExplanationSource,
    /// Similar past failures, when a similarity store is attached
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar_failures: Vec<SimilarFailure>,
}

/// Classification of the answer made before analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    /// A genuine attempt at answering
    #[default]
    Response,
    /// The model declined to answer
    Refusal,
}

/// A recoverable failure absorbed during the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    /// Stage in which it happened
    pub stage: PipelineStage,
    /// Component that degraded (detector name, "decomposer", "explainer", ...)
    pub component: String,
    /// What went wrong
    pub reason: String,
}

/// Bookkeeping attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisMetadata {
    /// Precheck classification of the answer
    pub answer_kind: AnswerKind,
    /// Findings dropped for violating structural invariants
    pub dropped_findings: usize,
    /// Assumptions the answer as a whole depends on
    #[serde(default)]
    pub assumptions: Vec<String>,
    /// Reasoning chain reported by the decomposer
    #[serde(default)]
    pub reasoning_chain: Vec<String>,
    /// Wall time per stage in milliseconds
    #[serde(default)]
    pub stage_timings_ms: BTreeMap<String, u64>,
    /// Completion time, seconds since Unix epoch
    pub created_at: u64,
}

/// Complete, serializable outcome of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Case identifier
    pub case_id: CaseId,
    /// The analysed request
    pub request: AnalysisRequest,
    /// True iff at least one finding survived aggregation
    pub failure_detected: bool,
    /// Distinct failure types in finding order
    pub failure_types: Vec<FailureType>,
    /// Aggregated findings, ordered by descending (severity, confidence)
    pub failures: Vec<FailureFinding>,
    /// Decomposed claims with their verdicts
    pub claims: Vec<Claim>,
    /// Risk assessment
    pub risk_assessment: RiskAssessment,
    /// Ordered recommendations
    pub recommendations: Vec<Recommendation>,
    /// Narrative explanation
    pub explanation: Explanation,
    /// True when any recoverable failure was absorbed
    pub degraded: bool,
    /// The absorbed failures
    #[serde(default)]
    pub degradations: Vec<Degradation>,
    /// Bookkeeping
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Patterns to record in a similarity store, one per finding
    pub fn failure_patterns(&self) -> Vec<FailurePattern> {
        self.failures
            .iter()
            .map(|f| FailurePattern {
                case_id: self.case_id,
                failure_type: f.failure_type,
                severity: f.severity,
                description: f.description.clone(),
                question: self.request.question.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text_includes_type() {
        let pattern = FailurePattern {
            case_id: CaseId::new(),
            failure_type: FailureType::Overconfidence,
            severity: Severity::Medium,
            description: "Absolute language without evidence".to_string(),
            question: "Is it safe?".to_string(),
        };
        assert_eq!(
            pattern.embedding_text(),
            "overconfidence: Absolute language without evidence"
        );
    }

    #[test]
    fn test_degradation_serialization() {
        let degradation = Degradation {
            stage: PipelineStage::Detecting,
            component: "hallucination".to_string(),
            reason: "timed out".to_string(),
        };
        let json = serde_json::to_value(&degradation).unwrap();
        assert_eq!(json["stage"], "detecting");
    }
}
