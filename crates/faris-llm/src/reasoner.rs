//! Async access to a blocking reasoning backend

use crate::json::parse_json;
use faris_domain::traits::{CompletionConstraints, ReasoningBackend};
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

/// Errors from a single backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReasonerError {
    /// Backend use is switched off for this engine
    #[error("Reasoning backend disabled")]
    Disabled,

    /// The call exceeded its timeout
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// The backend returned an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend answered with something unusable
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    /// The blocking task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(String),
}

impl ReasonerError {
    /// Whether the error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReasonerError::Timeout(_))
    }
}

/// Shared handle to a reasoning backend with a per-call timeout
///
/// Each call runs on tokio's blocking pool, so concurrent callers in the same
/// fan-out never block each other. A timed-out call is abandoned: its result
/// is discarded when the blocking task finishes.
pub struct Reasoner<B> {
    backend: Arc<B>,
    call_timeout: Duration,
    enabled: bool,
}

impl<B> Clone for Reasoner<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            call_timeout: self.call_timeout,
            enabled: self.enabled,
        }
    }
}

impl<B> Reasoner<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    /// Wrap a backend with the given per-call timeout
    pub fn new(backend: Arc<B>, call_timeout: Duration) -> Self {
        Self {
            backend,
            call_timeout,
            enabled: true,
        }
    }

    /// Enable or disable backend calls
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether calls reach the backend
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The per-call timeout
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Run one completion
    pub async fn complete(
        &self,
        prompt: &str,
        constraints: CompletionConstraints,
    ) -> Result<String, ReasonerError> {
        if !self.enabled {
            return Err(ReasonerError::Disabled);
        }

        let backend = Arc::clone(&self.backend);
        let prompt = prompt.to_string();
        debug!("Calling {} with {} char prompt", self.backend.name(), prompt.len());

        // Call in a blocking context since ReasoningBackend is not async
        let task = tokio::task::spawn_blocking(move || {
            backend
                .complete(&prompt, &constraints)
                .map_err(|e| e.to_string())
        });

        timeout(self.call_timeout, task)
            .await
            .map_err(|_| ReasonerError::Timeout(self.call_timeout))?
            .map_err(|e| ReasonerError::Join(e.to_string()))?
            .map_err(ReasonerError::Backend)
    }

    /// Run one completion and parse the response as JSON
    pub async fn complete_json(
        &self,
        prompt: &str,
        constraints: CompletionConstraints,
    ) -> Result<Value, ReasonerError> {
        let response = self.complete(prompt, constraints).await?;
        parse_json(&response).map_err(ReasonerError::InvalidResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    fn reasoner(provider: MockProvider, timeout_ms: u64) -> Reasoner<MockProvider> {
        Reasoner::new(Arc::new(provider), Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn test_complete_returns_backend_text() {
        let r = reasoner(MockProvider::new("ok"), 1_000);
        let text = r.complete("prompt", CompletionConstraints::default()).await.unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_disabled_reasoner_never_calls_backend() {
        let provider = MockProvider::new("ok");
        let r = reasoner(provider.clone(), 1_000).with_enabled(false);

        let result = r.complete("prompt", CompletionConstraints::default()).await;
        assert_eq!(result, Err(ReasonerError::Disabled));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_error_is_mapped() {
        let mut provider = MockProvider::default();
        provider.add_error_rule("boom");
        let r = reasoner(provider, 1_000);

        let result = r.complete("boom", CompletionConstraints::default()).await;
        assert!(matches!(result, Err(ReasonerError::Backend(_))));
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let mut provider = MockProvider::default();
        provider.add_delayed_rule("slow", Duration::from_millis(300), "late");
        let r = reasoner(provider, 30);

        let result = r.complete("slow", CompletionConstraints::default()).await;
        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_complete_json_parses_fenced_output() {
        let r = reasoner(MockProvider::new("```json\n{\"a\": 1}\n```"), 1_000);
        let value = r.complete_json("p", CompletionConstraints::default()).await.unwrap();
        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn test_complete_json_rejects_prose() {
        let r = reasoner(MockProvider::new("I could not analyse this."), 1_000);
        let result = r.complete_json("p", CompletionConstraints::default()).await;
        assert!(matches!(result, Err(ReasonerError::InvalidResponse(_))));
    }
}
