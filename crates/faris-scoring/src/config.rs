//! Scoring configuration
//!
//! Every weight the risk formula uses lives here, one named field per key,
//! so the TOML surface spells out exactly what an operator can retune.

use faris_domain::{Domain, FailureType, RiskLevel, Severity};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Numeric weight per severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityWeights {
    /// Weight of a low-severity finding
    pub low: f64,
    /// Weight of a medium-severity finding
    pub medium: f64,
    /// Weight of a high-severity finding
    pub high: f64,
    /// Weight of a critical finding
    pub critical: f64,
}

impl SeverityWeights {
    /// Weight for `severity`
    pub fn get(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    fn values(&self) -> [(&'static str, f64); 4] {
        [
            ("low", self.low),
            ("medium", self.medium),
            ("high", self.high),
            ("critical", self.critical),
        ]
    }
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 0.25,
            medium: 0.5,
            high: 0.75,
            critical: 1.0,
        }
    }
}

/// Risk multiplier per request domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMultipliers {
    /// General knowledge
    pub general: f64,
    /// Medical and health
    pub medical: f64,
    /// Legal
    pub legal: f64,
    /// Financial
    pub finance: f64,
    /// Programming
    pub code: f64,
}

impl DomainMultipliers {
    /// Multiplier for `domain`
    pub fn get(&self, domain: Domain) -> f64 {
        match domain {
            Domain::General => self.general,
            Domain::Medical => self.medical,
            Domain::Legal => self.legal,
            Domain::Finance => self.finance,
            Domain::Code => self.code,
        }
    }

    fn values(&self) -> [(&'static str, f64); 5] {
        [
            ("general", self.general),
            ("medical", self.medical),
            ("legal", self.legal),
            ("finance", self.finance),
            ("code", self.code),
        ]
    }
}

impl Default for DomainMultipliers {
    fn default() -> Self {
        Self {
            general: 1.0,
            medical: 2.0,
            legal: 1.8,
            finance: 1.5,
            code: 1.3,
        }
    }
}

/// Emphasis per failure type; must sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureTypeWeights {
    /// Hallucination weight
    pub hallucination: f64,
    /// Logical inconsistency weight
    pub logical_inconsistency: f64,
    /// Missing assumptions weight
    pub missing_assumptions: f64,
    /// Overconfidence weight
    pub overconfidence: f64,
    /// Scope violation weight
    pub scope_violation: f64,
    /// Underspecification weight
    pub underspecification: f64,
}

impl FailureTypeWeights {
    /// Weight for `failure_type`
    pub fn get(&self, failure_type: FailureType) -> f64 {
        match failure_type {
            FailureType::Hallucination => self.hallucination,
            FailureType::LogicalInconsistency => self.logical_inconsistency,
            FailureType::MissingAssumptions => self.missing_assumptions,
            FailureType::Overconfidence => self.overconfidence,
            FailureType::ScopeViolation => self.scope_violation,
            FailureType::Underspecification => self.underspecification,
        }
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        FailureType::ALL.iter().map(|t| self.get(*t)).sum()
    }
}

impl Default for FailureTypeWeights {
    fn default() -> Self {
        Self {
            hallucination: 0.35,
            logical_inconsistency: 0.25,
            missing_assumptions: 0.20,
            overconfidence: 0.10,
            scope_violation: 0.05,
            underspecification: 0.05,
        }
    }
}

/// Score boundaries between risk levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Scores at or above this are at least medium
    pub medium: f64,
    /// Scores at or above this are high
    pub high: f64,
}

impl RiskThresholds {
    /// Band a score
    pub fn level(&self, score: f64) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { medium: 0.4, high: 0.7 }
    }
}

/// Configuration for aggregation and risk scoring
///
/// # Examples
///
/// ```
/// use faris_scoring::ScoringConfig;
///
/// let config = ScoringConfig::default();
/// assert_eq!(config.thresholds.high, 0.7);
/// assert!(config.validate().is_ok());
///
/// // Flags risk earlier
/// let config = ScoringConfig::aggressive();
/// assert!(config.thresholds.high < 0.7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight per severity
    #[serde(default)]
    pub severity_weights: SeverityWeights,

    /// Multiplier per domain
    #[serde(default)]
    pub domain_multipliers: DomainMultipliers,

    /// Weight per failure type
    #[serde(default)]
    pub failure_type_weights: FailureTypeWeights,

    /// Level boundaries
    #[serde(default)]
    pub thresholds: RiskThresholds,

    /// Half-width of the confidence interval per unit of confidence
    /// standard deviation
    pub interval_width: f64,

    /// Maximum number of risk factors reported
    pub max_risk_factors: usize,

    /// Findings below this confidence are discarded by the aggregator
    pub min_finding_confidence: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            severity_weights: SeverityWeights::default(),
            domain_multipliers: DomainMultipliers::default(),
            failure_type_weights: FailureTypeWeights::default(),
            thresholds: RiskThresholds::default(),
            interval_width: 1.0,
            max_risk_factors: 3,
            min_finding_confidence: 0.5,
        }
    }
}

impl ScoringConfig {
    /// Aggressive preset: lower thresholds, weaker findings kept
    pub fn aggressive() -> Self {
        Self {
            thresholds: RiskThresholds { medium: 0.3, high: 0.6 },
            interval_width: 1.5,
            max_risk_factors: 5,
            min_finding_confidence: 0.4,
            ..Self::default()
        }
    }

    /// Lenient preset: higher thresholds, only confident findings kept
    pub fn lenient() -> Self {
        Self {
            thresholds: RiskThresholds { medium: 0.5, high: 0.8 },
            interval_width: 1.0,
            max_risk_factors: 3,
            min_finding_confidence: 0.6,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let weights = self
            .severity_weights
            .values()
            .into_iter()
            .map(|(k, v)| (format!("severity_weights.{}", k), v))
            .chain(
                self.domain_multipliers
                    .values()
                    .into_iter()
                    .map(|(k, v)| (format!("domain_multipliers.{}", k), v)),
            )
            .chain(FailureType::ALL.iter().map(|t| {
                (
                    format!("failure_type_weights.{}", t.as_str()),
                    self.failure_type_weights.get(*t),
                )
            }));
        for (key, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", key, value));
            }
        }

        let sum = self.failure_type_weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("failure_type_weights must sum to 1.0, got {}", sum));
        }

        let RiskThresholds { medium, high } = self.thresholds;
        if !(medium > 0.0 && medium < 1.0 && high > 0.0 && high < 1.0) {
            return Err("thresholds must lie strictly between 0 and 1".to_string());
        }
        if medium >= high {
            return Err(format!(
                "thresholds.medium ({}) must be below thresholds.high ({})",
                medium, high
            ));
        }

        if !self.interval_width.is_finite() || self.interval_width < 0.0 {
            return Err("interval_width must be a non-negative number".to_string());
        }
        if self.max_risk_factors == 0 {
            return Err("max_risk_factors must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_finding_confidence) {
            return Err("min_finding_confidence must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
