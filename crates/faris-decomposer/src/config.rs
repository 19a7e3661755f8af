//! Configuration for the Decomposer

use serde::{Deserialize, Serialize};

/// Configuration for the Decomposer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecomposerConfig {
    /// Maximum number of claims kept per answer
    pub max_claims: usize,

    /// Maximum answer length (characters)
    pub max_answer_length: usize,

    /// Fallback sentences of this many characters or fewer are skipped
    pub min_sentence_chars: usize,

    /// Maximum generated tokens for the decomposition call
    pub max_tokens: u32,
}

impl DecomposerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_claims == 0 {
            return Err("max_claims must be greater than 0".to_string());
        }
        if self.max_answer_length == 0 {
            return Err("max_answer_length must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Same configuration with a different claim cap
    pub fn with_max_claims(mut self, max_claims: usize) -> Self {
        self.max_claims = max_claims;
        self
    }
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self {
            max_claims: 20,
            max_answer_length: 50_000,
            min_sentence_chars: 10,
            max_tokens: 1536,
        }
    }
}

impl DecomposerConfig {
    /// Aggressive preset: fewer claims, smaller responses
    pub fn aggressive() -> Self {
        Self {
            max_claims: 10,
            max_answer_length: 20_000,
            min_sentence_chars: 10,
            max_tokens: 1024,
        }
    }

    /// Lenient preset: more claims, larger responses
    pub fn lenient() -> Self {
        Self {
            max_claims: 40,
            max_answer_length: 100_000,
            min_sentence_chars: 10,
            max_tokens: 3072,
        }
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
    fn test_presets_are_valid() {
        assert!(DecomposerConfig::default().validate().is_ok());
        assert!(DecomposerConfig::aggressive().validate().is_ok());
        assert!(DecomposerConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_claims() {
        let config = DecomposerConfig::default().with_max_claims(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DecomposerConfig::lenient();
        let parsed = DecomposerConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
