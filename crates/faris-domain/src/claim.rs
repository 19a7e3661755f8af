//! Claim module - atomic assertions extracted from an answer

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier of a claim, unique within one analysis request
///
/// Ids are ordinals assigned by the decomposer in answer order and render as
/// `c1`, `c2`, ... which is also the form detectors and the reasoning
/// backend use to refer to claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimId(u32);

impl ClaimId {
    /// Create a ClaimId from its 1-based ordinal
    pub fn from_ordinal(ordinal: u32) -> Self {
        Self(ordinal)
    }

    /// Get the 1-based ordinal
    pub fn ordinal(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl FromStr for ClaimId {
    type Err = String;

    /// Parse `c3`, `C3` or a bare `3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('c')
            .or_else(|| trimmed.strip_prefix('C'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(Self)
            .ok_or_else(|| format!("Invalid claim id: {}", s))
    }
}

impl Serialize for ClaimId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClaimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of statement a claim makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    /// A checkable statement of fact
    #[default]
    Factual,
    /// A subjective judgment
    Opinion,
    /// An inference step connecting other claims
    Reasoning,
}

impl ClaimType {
    /// Parse a claim type, defaulting unknown labels to `Factual`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "opinion" => ClaimType::Opinion,
            "reasoning" | "inference" => ClaimType::Reasoning,
            _ => ClaimType::Factual,
        }
    }
}

/// Truth judgment assigned to a claim by a detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Not examined, or no judgment possible
    #[default]
    Unverified,
    /// Supported by context or evidence
    True,
    /// Contradicted or fabricated
    False,
    /// Partly supported
    Partial,
}

impl Verdict {
    /// Get the verdict label
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Unverified => "unverified",
            Verdict::True => "true",
            Verdict::False => "false",
            Verdict::Partial => "partial",
        }
    }

    /// Parse a verdict label
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unverified" | "unknown" => Some(Verdict::Unverified),
            "true" | "supported" => Some(Verdict::True),
            "false" | "unsupported" | "contradicted" => Some(Verdict::False),
            "partial" | "partially_supported" => Some(Verdict::Partial),
            _ => None,
        }
    }
}

/// A verdict a detector wants applied to one claim it examined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerdict {
    /// The examined claim
    pub claim_id: ClaimId,
    /// The judgment
    pub verdict: Verdict,
}

/// An atomic, independently checkable assertion extracted from an answer
///
/// Claims are produced once by the decomposer. The only field written
/// afterwards is `verdict`, and only by the orchestrator after the detection
/// barrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Identifier, unique within the request
    pub id: ClaimId,

    /// Self-contained assertion text
    pub text: String,

    /// Whether the claim can be checked against context or evidence
    pub verifiable: bool,

    /// Detector judgment
    #[serde(default)]
    pub verdict: Verdict,

    /// Kind of statement
    #[serde(default)]
    pub claim_type: ClaimType,

    /// Unstated premises the claim depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implicit_assumptions: Vec<String>,
}

impl Claim {
    /// Create an unverified factual claim
    pub fn new(id: ClaimId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            verifiable: true,
            verdict: Verdict::Unverified,
            claim_type: ClaimType::Factual,
            implicit_assumptions: Vec::new(),
        }
    }

    /// Set the claim type; only factual claims stay verifiable
    pub fn with_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = claim_type;
        self.verifiable = claim_type == ClaimType::Factual;
        self
    }

    /// Attach implicit assumptions
    pub fn with_assumptions(mut self, assumptions: Vec<String>) -> Self {
        self.implicit_assumptions = assumptions;
        self
    }
}
