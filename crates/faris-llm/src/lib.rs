//! FARIS Reasoning Backend Layer
//!
//! Pluggable implementations of the `ReasoningBackend` trait from
//! `faris-domain`, plus the async wrapper every pipeline stage uses to call
//! them.
//!
//! # Providers
//!
//! - `MockProvider`: scripted, deterministic backend for tests
//! - `OllamaProvider`: local Ollama API integration
//!
//! # Calling a backend from async code
//!
//! Backends are blocking. [`Reasoner`] runs each call on the blocking pool
//! under its own timeout so a slow call never stalls sibling tasks.
//!
//! # Examples
//!
//! ```
//! use faris_llm::MockProvider;
//! use faris_domain::traits::{CompletionConstraints, ReasoningBackend};
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete("test prompt", &CompletionConstraints::default()).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod json;
pub mod ollama;
mod reasoner;

use faris_domain::traits::{CompletionConstraints, ReasoningBackend};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use reasoner::{Reasoner, ReasonerError};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Scripted reply of the mock provider
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
    Delayed(Duration, String),
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen in this order:
/// 1. an exact-prompt response registered with `add_response`
/// 2. the first rule whose marker is contained in the prompt
/// 3. the default response
///
/// Rules make it possible to script a whole pipeline run, since every
/// pipeline prompt starts with a distinctive task header.
///
/// # Examples
///
/// ```
/// use faris_llm::MockProvider;
/// use faris_domain::traits::{CompletionConstraints, ReasoningBackend};
///
/// let mut provider = MockProvider::default();
/// provider.add_rule("TASK: greet", "hello");
/// let c = CompletionConstraints::default();
/// assert_eq!(provider.complete("TASK: greet\nsay hi", &c).unwrap(), "hello");
/// assert_eq!(provider.complete("other", &c).unwrap(), "{}");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<AtomicUsize>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a specific response for an exact prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        guard(&self.responses).insert(prompt.into(), MockReply::Text(response.into()));
    }

    /// Configure to return an error for an exact prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        guard(&self.responses).insert(prompt.into(), MockReply::Error("Mock error".to_string()));
    }

    /// Reply with `response` to any prompt containing `marker`
    pub fn add_rule(&mut self, marker: impl Into<String>, response: impl Into<String>) {
        guard(&self.rules).push((marker.into(), MockReply::Text(response.into())));
    }

    /// Fail any prompt containing `marker`
    pub fn add_error_rule(&mut self, marker: impl Into<String>) {
        guard(&self.rules).push((marker.into(), MockReply::Error("Mock error".to_string())));
    }

    /// Block for `delay` and then reply to any prompt containing `marker`
    pub fn add_delayed_rule(
        &mut self,
        marker: impl Into<String>,
        delay: Duration,
        response: impl Into<String>,
    ) {
        guard(&self.rules).push((marker.into(), MockReply::Delayed(delay, response.into())));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        guard(&self.prompts).clone()
    }

    fn reply_for(&self, prompt: &str) -> MockReply {
        if let Some(reply) = guard(&self.responses).get(prompt) {
            return reply.clone();
        }
        guard(&self.rules)
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| MockReply::Text(self.default_response.clone()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl ReasoningBackend for MockProvider {
    type Error = LlmError;

    fn complete(&self, prompt: &str, _constraints: &CompletionConstraints) -> Result<String, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        guard(&self.prompts).push(prompt.to_string());

        match self.reply_for(prompt) {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(message) => Err(LlmError::Other(message)),
            MockReply::Delayed(delay, text) => {
                std::thread::sleep(delay);
                Ok(text)
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> CompletionConstraints {
        CompletionConstraints::default()
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete("any prompt", &constraints());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::new("fallback");
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete("hello", &constraints()).unwrap(), "world");
        assert_eq!(provider.complete("foo", &constraints()).unwrap(), "bar");
        assert_eq!(provider.complete("unknown", &constraints()).unwrap(), "fallback");
    }

    #[test]
    fn test_exact_response_wins_over_rule() {
        let mut provider = MockProvider::default();
        provider.add_rule("hello", "from rule");
        provider.add_response("hello", "exact");

        assert_eq!(provider.complete("hello", &constraints()).unwrap(), "exact");
        assert_eq!(provider.complete("hello there", &constraints()).unwrap(), "from rule");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut provider = MockProvider::default();
        provider.add_rule("TASK: a", "first");
        provider.add_rule("TASK", "second");

        assert_eq!(provider.complete("TASK: a", &constraints()).unwrap(), "first");
        assert_eq!(provider.complete("TASK: b", &constraints()).unwrap(), "second");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete("prompt1", &constraints()).unwrap();
        provider.complete("prompt2", &constraints()).unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");
        provider.add_error_rule("TASK: broken");

        assert!(matches!(
            provider.complete("bad prompt", &constraints()),
            Err(LlmError::Other(_))
        ));
        assert!(provider.complete("TASK: broken now", &constraints()).is_err());
    }

    #[test]
    fn test_delayed_rule_blocks() {
        let mut provider = MockProvider::default();
        provider.add_delayed_rule("slow", Duration::from_millis(20), "done");

        let start = std::time::Instant::now();
        assert_eq!(provider.complete("slow call", &constraints()).unwrap(), "done");
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete("test", &constraints()).unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
