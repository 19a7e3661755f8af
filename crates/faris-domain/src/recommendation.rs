//! Remediation recommendations

use crate::failure::FailureType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of remediation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    /// Fix this specific answer
    Correction,
    /// Change the surrounding system (retrieval, verification, filtering)
    Architecture,
    /// Change the prompt
    Prompting,
    /// Change how the answer is presented or clarified with users
    Ux,
    /// Change model or decoding configuration
    Config,
}

impl RecommendationType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Correction => "correction",
            RecommendationType::Architecture => "architecture",
            RecommendationType::Prompting => "prompting",
            RecommendationType::Ux => "ux",
            RecommendationType::Config => "config",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a recommendation, ordered low < medium < high
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have
    Low,
    /// Should be scheduled
    Medium,
    /// Address before deployment
    High,
}

impl Priority {
    /// Get the priority name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An actionable remediation item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Category
    #[serde(rename = "type")]
    pub kind: RecommendationType,

    /// Urgency, derived from the addressed findings
    pub priority: Priority,

    /// Short action title
    pub title: String,

    /// What to do
    pub description: String,

    /// Failure types this remediation addresses
    pub addresses: Vec<FailureType>,

    /// Technical guidance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_hint: Option<String>,
}
