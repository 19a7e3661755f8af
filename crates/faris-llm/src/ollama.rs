//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API so analyses can run
//! against local models.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama's `/api/generate`
//! - System prompt, temperature, token limit and JSON mode per call
//! - Retry logic with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use faris_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1:8b");
//! ```

use crate::LlmError;
use faris_domain::traits::{CompletionConstraints, ReasoningBackend};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    stream: bool,
    options: GenerateOptions,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1:8b", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with a custom HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a new Ollama provider at `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of retry attempts (at least one attempt is made)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text using Ollama API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails
    /// - Response format is invalid
    pub async fn generate(
        &self,
        prompt: &str,
        constraints: &CompletionConstraints,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system: constraints.system.as_deref(),
            format: constraints.json_output.then_some("json"),
            stream: false,
            options: GenerateOptions {
                temperature: constraints.temperature,
                num_predict: constraints.max_tokens,
            },
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<OllamaGenerateResponse>()
                            .await
                            .map(|r| r.response)
                            .map_err(|e| {
                                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                            });
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Ollama call failed (attempt {}), retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    fn block_on_generate(
        &self,
        prompt: &str,
        constraints: &CompletionConstraints,
    ) -> anyhow::Result<String> {
        let future = self.generate(prompt, constraints);
        match tokio::runtime::Handle::try_current() {
            // Blocking-pool threads carry the runtime handle
            Ok(handle) => Ok(handle.block_on(future)?),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                Ok(runtime.block_on(future)?)
            }
        }
    }
}

impl ReasoningBackend for OllamaProvider {
    type Error = LlmError;

    fn complete(&self, prompt: &str, constraints: &CompletionConstraints) -> Result<String, Self::Error> {
        self.block_on_generate(prompt, constraints)
            .map_err(|e| match e.downcast::<LlmError>() {
                Ok(llm_error) => llm_error,
                Err(other) => LlmError::Other(other.to_string()),
            })
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3.1:8b");
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model(), "llama3.1:8b");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model, "mistral");
    }

    #[test]
    fn test_max_retries_never_zero() {
        let provider = OllamaProvider::default_endpoint(DEFAULT_MODEL).with_max_retries(0);
        assert_eq!(provider.max_retries, 1);
    }

    #[test]
    fn test_request_body_shape() {
        let constraints = CompletionConstraints::json_with_system("be strict");
        let body = OllamaGenerateRequest {
            model: "m",
            prompt: "p",
            system: constraints.system.as_deref(),
            format: constraints.json_output.then_some("json"),
            stream: false,
            options: GenerateOptions {
                temperature: constraints.temperature,
                num_predict: constraints.max_tokens,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["format"], "json");
        assert_eq!(json["system"], "be strict");
        assert_eq!(json["options"]["num_predict"], 1536);
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_generate_integration() {
        let provider = OllamaProvider::default_endpoint(DEFAULT_MODEL);
        let result = provider
            .generate("Say 'hello' and nothing else", &CompletionConstraints::prose(0.0, 16))
            .await;
        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Port 9 (discard) is closed on test machines
        let provider = OllamaProvider::new("http://127.0.0.1:9", "llama2").with_max_retries(1);

        let result = provider.generate("test", &CompletionConstraints::default()).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
