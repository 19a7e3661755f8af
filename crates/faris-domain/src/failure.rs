//! Failure taxonomy and detector findings

use crate::claim::ClaimId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed failure taxonomy
///
/// The analysis never reports failures outside these six types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    /// Unsupported or fabricated content
    Hallucination,
    /// Contradictions, circular or invalid reasoning
    LogicalInconsistency,
    /// Unstated prerequisites the answer depends on
    MissingAssumptions,
    /// Certainty not backed by evidence
    Overconfidence,
    /// Content beyond the question's scope or capability boundary
    ScopeViolation,
    /// Not enough actionable detail for what was asked
    Underspecification,
}

impl FailureType {
    /// All failure types in canonical order
    pub const ALL: [FailureType; 6] = [
        FailureType::Hallucination,
        FailureType::LogicalInconsistency,
        FailureType::MissingAssumptions,
        FailureType::Overconfidence,
        FailureType::ScopeViolation,
        FailureType::Underspecification,
    ];

    /// Get the snake_case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureType::Hallucination => "hallucination",
            FailureType::LogicalInconsistency => "logical_inconsistency",
            FailureType::MissingAssumptions => "missing_assumptions",
            FailureType::Overconfidence => "overconfidence",
            FailureType::ScopeViolation => "scope_violation",
            FailureType::Underspecification => "underspecification",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            FailureType::Hallucination => "Hallucination",
            FailureType::LogicalInconsistency => "Logical Inconsistency",
            FailureType::MissingAssumptions => "Missing Assumptions",
            FailureType::Overconfidence => "Overconfidence",
            FailureType::ScopeViolation => "Scope Violation",
            FailureType::Underspecification => "Underspecification",
        }
    }
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        FailureType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Invalid failure type: {}", s))
    }
}

/// Severity of a finding, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or minor
    Low,
    /// Worth fixing before production
    Medium,
    /// Likely to mislead users
    High,
    /// Can cause direct harm
    Critical,
}

impl Severity {
    /// Numeric rank (low = 0 .. critical = 3) used for ordering
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }

    /// One level more severe, saturating at critical
    pub fn escalate(&self) -> Self {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }

    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Parse a severity label
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" | "moderate" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detector's evidence-backed assertion that a failure is present
///
/// `confidence` is the detector's own belief that the failure exists and is
/// independent of `severity`; the two are only combined by the risk scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureFinding {
    /// Failure type
    pub failure_type: FailureType,

    /// Severity
    pub severity: Severity,

    /// Detector confidence in [0, 1]
    pub confidence: f64,

    /// Human-readable description
    pub description: String,

    /// Claims this finding implicates
    #[serde(default)]
    pub claim_ids: Vec<ClaimId>,

    /// Supporting evidence strings
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl FailureFinding {
    /// Create a finding with no implicated claims or evidence
    pub fn new(
        failure_type: FailureType,
        severity: Severity,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            failure_type,
            severity,
            confidence,
            description: description.into(),
            claim_ids: Vec::new(),
            evidence: Vec::new(),
        }
    }

    /// Set the implicated claims
    pub fn with_claims(mut self, claim_ids: impl IntoIterator<Item = ClaimId>) -> Self {
        self.claim_ids = claim_ids.into_iter().collect();
        self
    }

    /// Append one evidence string
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    /// Whether this finding implicates any of the given claims
    pub fn overlaps(&self, other: &FailureFinding) -> bool {
        self.claim_ids.iter().any(|id| other.claim_ids.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_type_parsing() {
        assert_eq!("hallucination".parse::<FailureType>().unwrap(), FailureType::Hallucination);
        assert_eq!(
            "Logical Inconsistency".parse::<FailureType>().unwrap(),
            FailureType::LogicalInconsistency
        );
        assert_eq!(
            "scope-violation".parse::<FailureType>().unwrap(),
            FailureType::ScopeViolation
        );
        assert!("bias".parse::<FailureType>().is_err());
    }

    #[test]
    fn test_failure_type_serde_names() {
        let json = serde_json::to_string(&FailureType::MissingAssumptions).unwrap();
        assert_eq!(json, "\"missing_assumptions\"");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::Critical.rank(), 3);
    }

    #[test]
    fn test_severity_escalation_saturates() {
        assert_eq!(Severity::Low.escalate(), Severity::Medium);
        assert_eq!(Severity::High.escalate(), Severity::Critical);
        assert_eq!(Severity::Critical.escalate(), Severity::Critical);
    }

    #[test]
    fn test_overlap() {
        let a = FailureFinding::new(FailureType::Hallucination, Severity::High, 0.9, "a")
            .with_claims([ClaimId::from_ordinal(1), ClaimId::from_ordinal(2)]);
        let b = FailureFinding::new(FailureType::Hallucination, Severity::Medium, 0.6, "b")
            .with_claims([ClaimId::from_ordinal(2)]);
        let c = FailureFinding::new(FailureType::Hallucination, Severity::Medium, 0.6, "c");

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&c));
    }
}
