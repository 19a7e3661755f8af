//! Risk assessment value types

use crate::failure::{FailureType, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval [lower, upper] bounding the uncertainty of a risk score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound [0.0, 1.0]
    pub lower: f64,
    /// Upper bound [0.0, 1.0]
    pub upper: f64,
}

impl ConfidenceInterval {
    /// A zero-width interval at `value`
    pub fn point(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    /// Interval of `half_width` around `center`, clamped to [0, 1]
    pub fn around(center: f64, half_width: f64) -> Self {
        let half_width = half_width.max(0.0);
        Self {
            lower: (center - half_width).clamp(0.0, 1.0),
            upper: (center + half_width).clamp(0.0, 1.0),
        }
    }

    /// Get the width of the interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check if the interval contains a value
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Discrete risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Safe to use with standard review
    Low,
    /// Review flagged concerns first
    Medium,
    /// Do not deploy without correction
    High,
}

impl RiskLevel {
    /// Get the level name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding's share of the raw risk sum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContribution {
    /// Failure type of the finding
    pub failure_type: FailureType,
    /// Severity of the finding
    pub severity: Severity,
    /// Finding confidence
    pub confidence: f64,
    /// Severity weight applied
    pub severity_weight: f64,
    /// Failure-type weight applied
    pub type_weight: f64,
    /// `confidence × severity_weight × domain_multiplier × type_weight`
    pub contribution: f64,
}

/// Deterministic risk judgment for one analysed answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Score in [0, 1]
    pub score: f64,

    /// Band derived from the configured thresholds
    pub level: RiskLevel,

    /// Uncertainty bounds; always contains `score`
    pub confidence_interval: ConfidenceInterval,

    /// Short descriptions of the most heavily weighted findings
    pub risk_factors: Vec<String>,

    /// Per-finding breakdown of the raw sum, in finding order
    pub contributions: Vec<RiskContribution>,

    /// Multiplier applied for the request domain
    pub domain_multiplier: f64,

    /// Multi-line human-readable summary
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_around_clamps() {
        let ci = ConfidenceInterval::around(0.95, 0.2);
        assert_eq!(ci.upper, 1.0);
        assert!((ci.lower - 0.75).abs() < 1e-12);
        assert!(ci.contains(0.95));
    }

    #[test]
    fn test_point_interval() {
        let ci = ConfidenceInterval::point(0.0);
        assert_eq!(ci.width(), 0.0);
        assert!(ci.contains(0.0));
    }

    #[test]
    fn test_negative_half_width_is_ignored() {
        let ci = ConfidenceInterval::around(0.5, -1.0);
        assert_eq!(ci, ConfidenceInterval::point(0.5));
    }
}
