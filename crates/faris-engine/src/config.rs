//! Configuration for the analysis engine
//!
//! Timeouts, limits and switches for one orchestrator. The risk formula's
//! weights live in the nested [`ScoringConfig`].

use faris_decomposer::DecomposerConfig;
use faris_scoring::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the analysis engine
///
/// Passed by value into the orchestrator; running two configurations side
/// by side means building two orchestrators.
///
/// # Examples
///
/// ```
/// use faris_engine::EngineConfig;
///
/// // Default configuration (balanced)
/// let config = EngineConfig::default();
/// assert_eq!(config.max_claims, 20);
///
/// // Short timeouts, fewer claims
/// let config = EngineConfig::aggressive();
/// assert_eq!(config.max_claims, 10);
///
/// // Long timeouts, more claims
/// let config = EngineConfig::lenient();
/// assert_eq!(config.max_claims, 40);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Aggregation and risk formula settings
    pub scoring: ScoringConfig,

    /// Budget for one detector, backend call included (milliseconds)
    /// Default: 30 seconds
    pub detector_timeout_ms: u64,

    /// Budget for one reasoning backend call (milliseconds)
    /// Default: 20 seconds
    pub backend_call_timeout_ms: u64,

    /// Budget for one similarity store call (milliseconds)
    /// Default: 2 seconds
    pub store_call_timeout_ms: u64,

    /// Overall budget for one analysis (milliseconds)
    /// Default: 120 seconds
    pub deadline_ms: u64,

    /// Maximum number of claims extracted per answer
    pub max_claims: usize,

    /// Whether detectors, the decomposer and the explainer call the
    /// reasoning backend at all
    pub use_reasoning_backend: bool,

    /// Catalog entries taken per surviving failure type
    pub max_recommendations_per_type: usize,

    /// Neighbours fetched per failure type from the similarity store
    pub similar_failures_k: usize,

    /// Append a pattern per surviving finding to the similarity store
    pub record_patterns: bool,

    /// Reject error dumps and flag refusals before decomposition
    pub precheck: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            detector_timeout_ms: 30_000,
            backend_call_timeout_ms: 20_000,
            store_call_timeout_ms: 2_000,
            deadline_ms: 120_000,
            max_claims: 20,
            use_reasoning_backend: true,
            max_recommendations_per_type: 2,
            similar_failures_k: 3,
            record_patterns: true,
            precheck: true,
        }
    }
}

impl EngineConfig {
    /// Aggressive configuration (short timeouts, fewer claims)
    ///
    /// Suitable for interactive use where a fast degraded answer beats a
    /// slow complete one.
    pub fn aggressive() -> Self {
        Self {
            scoring: ScoringConfig::aggressive(),
            detector_timeout_ms: 10_000,
            backend_call_timeout_ms: 8_000,
            store_call_timeout_ms: 1_000,
            deadline_ms: 30_000,
            max_claims: 10,
            max_recommendations_per_type: 1,
            ..Self::default()
        }
    }

    /// Lenient configuration (long timeouts, more claims)
    ///
    /// Suitable for batch analysis against slow local models.
    pub fn lenient() -> Self {
        Self {
            scoring: ScoringConfig::lenient(),
            detector_timeout_ms: 90_000,
            backend_call_timeout_ms: 60_000,
            store_call_timeout_ms: 5_000,
            deadline_ms: 300_000,
            max_claims: 40,
            max_recommendations_per_type: 3,
            similar_failures_k: 5,
            ..Self::default()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "aggressive" => Some(Self::aggressive()),
            "lenient" => Some(Self::lenient()),
            _ => None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.scoring.validate()?;

        let timeouts = [
            ("detector_timeout_ms", self.detector_timeout_ms),
            ("backend_call_timeout_ms", self.backend_call_timeout_ms),
            ("store_call_timeout_ms", self.store_call_timeout_ms),
            ("deadline_ms", self.deadline_ms),
        ];
        for (key, value) in timeouts {
            if value == 0 {
                return Err(format!("{} must be greater than 0", key));
            }
        }
        if self.backend_call_timeout_ms > self.detector_timeout_ms {
            return Err(format!(
                "backend_call_timeout_ms ({}) must not exceed detector_timeout_ms ({})",
                self.backend_call_timeout_ms, self.detector_timeout_ms
            ));
        }
        if self.max_claims == 0 {
            return Err("max_claims must be greater than 0".to_string());
        }
        if self.max_recommendations_per_type == 0 {
            return Err("max_recommendations_per_type must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Decomposer settings derived from this configuration
    pub fn decomposer(&self) -> DecomposerConfig {
        DecomposerConfig::default().with_max_claims(self.max_claims)
    }

    /// Get detector timeout as Duration
    pub fn detector_timeout(&self) -> Duration {
        Duration::from_millis(self.detector_timeout_ms)
    }

    /// Get backend call timeout as Duration
    pub fn backend_call_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_call_timeout_ms)
    }

    /// Get store call timeout as Duration
    pub fn store_call_timeout(&self) -> Duration {
        Duration::from_millis(self.store_call_timeout_ms)
    }

    /// Get the request deadline as Duration
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.detector_timeout_ms, 30_000);
        assert_eq!(config.max_recommendations_per_type, 2);
        assert_eq!(config.similar_failures_k, 3);
        assert!(config.use_reasoning_backend);
        assert!(config.record_patterns);
        assert!(config.precheck);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        for name in ["default", "aggressive", "lenient"] {
            let config = EngineConfig::preset(name).unwrap();
            assert!(config.validate().is_ok(), "{} preset invalid", name);
        }
        assert!(EngineConfig::preset("reckless").is_none());
        assert!(EngineConfig::aggressive().deadline() < EngineConfig::default().deadline());
        assert!(EngineConfig::lenient().deadline() > EngineConfig::default().deadline());
    }

    #[test]
    fn test_duration_conversions() {
        let config = EngineConfig::default();
        assert_eq!(config.detector_timeout(), Duration::from_secs(30));
        assert_eq!(config.backend_call_timeout(), Duration::from_secs(20));
        assert_eq!(config.store_call_timeout(), Duration::from_secs(2));
        assert_eq!(config.deadline(), Duration::from_secs(120));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = EngineConfig::default();
        config.backend_call_timeout_ms = 60_000;
        assert!(config.validate().unwrap_err().contains("backend_call_timeout_ms"));

        let mut config = EngineConfig::default();
        config.deadline_ms = 0;
        assert!(config.validate().unwrap_err().contains("deadline_ms"));

        let mut config = EngineConfig::default();
        config.scoring.failure_type_weights.hallucination = 0.9;
        assert!(config.validate().unwrap_err().contains("sum to 1.0"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EngineConfig::aggressive();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[scoring.failure_type_weights]"));

        let parsed = EngineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            detector_timeout_ms = 5000
            backend_call_timeout_ms = 4000
            store_call_timeout_ms = 500
            deadline_ms = 20000
            max_claims = 8
            max_recommendations_per_type = 1
            similar_failures_k = 2
        "#;
        let config = EngineConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.max_claims, 8);
        assert!(config.use_reasoning_backend);
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.decomposer().max_claims, 8);
    }
}
