//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use faris_engine::EngineConfig;
use faris_llm::OllamaProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default case database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Reasoning backend connection
    #[serde(default)]
    pub backend: BackendSettings,

    /// Engine timeouts, limits and scoring weights
    #[serde(default)]
    pub engine: EngineConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputSettings,
}

/// Ollama backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Ollama API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP timeout per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per backend call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Could not find config directory".into()))?;
        Ok(dir.join("faris").join("config.toml"))
    }

    /// Load from `path`, or the default path when none is given.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check backend and engine settings.
    pub fn validate(&self) -> Result<()> {
        if self.backend.timeout_secs == 0 {
            return Err(CliError::Config("backend.timeout_secs must be positive".into()));
        }
        if self.backend.model.trim().is_empty() {
            return Err(CliError::Config("backend.model must not be empty".into()));
        }
        self.engine.validate().map_err(CliError::Config)
    }
}

impl BackendSettings {
    /// Build the Ollama provider these settings describe
    pub fn provider(&self) -> OllamaProvider {
        OllamaProvider::with_timeout(
            &self.endpoint,
            &self.model,
            Duration::from_secs(self.timeout_secs),
        )
        .with_max_retries(self.max_retries)
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.model, "llama3.1:8b");
        assert_eq!(config.output.format, OutputFormat::Table);
        assert!(config.output.color);
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.backend.model = "mistral".to_string();
        config.engine = EngineConfig::aggressive();
        config.output.format = OutputFormat::Json;
        config.database = Some(dir.path().join("faris.db"));
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.backend.model, "mistral");
        assert_eq!(loaded.engine, EngineConfig::aggressive());
        assert_eq!(loaded.output.format, OutputFormat::Json);
        assert_eq!(loaded.database, config.database);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "database = \"cases.db\"\n\n[engine]\nmax_claims = 5\n\n[output]\ncolor = false\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.engine.max_claims, 5);
        assert_eq!(config.engine.deadline_ms, EngineConfig::default().deadline_ms);
        assert!(!config.output.color);
        assert_eq!(config.backend.endpoint, "http://localhost:11434");
        assert_eq!(config.database, Some(PathBuf::from("cases.db")));
    }

    #[test]
    fn test_invalid_engine_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine]\nmax_claims = 0\n").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }
}
