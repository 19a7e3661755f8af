//! Core Decomposer implementation

use crate::config::DecomposerConfig;
use crate::error::DecomposerError;
use crate::normalize::{normalize_claims, split_sentences};
use crate::parser::{parse_decomposition, ClaimCandidate};
use crate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::types::{Decomposition, DecompositionSource};
use faris_domain::traits::{CompletionConstraints, ReasoningBackend};
use faris_domain::AnalysisRequest;
use faris_llm::{Reasoner, ReasonerError};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Splits an answer into ordered atomic claims
pub struct Decomposer<B> {
    reasoner: Reasoner<B>,
    config: DecomposerConfig,
}

impl<B> Decomposer<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    /// Create a new Decomposer
    pub fn new(reasoner: Reasoner<B>, config: DecomposerConfig) -> Self {
        Self { reasoner, config }
    }

    /// The active configuration
    pub fn config(&self) -> &DecomposerConfig {
        &self.config
    }

    /// Decompose the request's answer into claims
    ///
    /// Backend failures never surface here: the answer is split into
    /// sentences instead and the reason is kept on the result.
    ///
    /// # Errors
    ///
    /// Fails only for an empty or oversized answer.
    pub async fn decompose(&self, request: &AnalysisRequest) -> Result<Decomposition, DecomposerError> {
        let answer = request.answer.trim();
        if answer.is_empty() {
            return Err(DecomposerError::EmptyAnswer);
        }
        if answer.len() > self.config.max_answer_length {
            return Err(DecomposerError::AnswerTooLong(
                answer.len(),
                self.config.max_answer_length,
            ));
        }

        if !self.reasoner.is_enabled() {
            debug!("Backend disabled, splitting answer into sentences");
            return Ok(self.sentence_split(answer, None));
        }

        match self.decompose_with_backend(request, answer).await {
            Ok(decomposition) => {
                info!("Decomposed answer into {} claims", decomposition.claims.len());
                Ok(decomposition)
            }
            Err(reason) => {
                warn!("Decomposition fell back to sentence split: {}", reason);
                Ok(self.sentence_split(answer, Some(reason)))
            }
        }
    }

    async fn decompose_with_backend(
        &self,
        request: &AnalysisRequest,
        answer: &str,
    ) -> Result<Decomposition, String> {
        let prompt = PromptBuilder::new(&request.question, answer, request.domain)
            .with_context(request.context_text())
            .with_max_claims(self.config.max_claims)
            .build();
        debug!("Decomposition prompt length: {} chars", prompt.len());

        let constraints = CompletionConstraints {
            max_tokens: self.config.max_tokens,
            ..CompletionConstraints::json_with_system(SYSTEM_PROMPT)
        };
        let response = self
            .reasoner
            .complete(&prompt, constraints)
            .await
            .map_err(|e: ReasonerError| e.to_string())?;

        let parsed = parse_decomposition(&response).map_err(|e| e.to_string())?;
        Ok(Decomposition {
            claims: normalize_claims(parsed.claims, answer, self.config.max_claims),
            assumptions: parsed.overall_assumptions,
            reasoning_chain: parsed.reasoning_chain,
            source: DecompositionSource::Backend,
            fallback_reason: None,
        })
    }

    fn sentence_split(&self, answer: &str, reason: Option<String>) -> Decomposition {
        let candidates = split_sentences(answer, self.config.min_sentence_chars)
            .into_iter()
            .map(ClaimCandidate::factual)
            .collect();

        Decomposition {
            claims: normalize_claims(candidates, answer, self.config.max_claims),
            assumptions: Vec::new(),
            reasoning_chain: Vec::new(),
            source: DecompositionSource::SentenceSplit,
            fallback_reason: reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_domain::Domain;
    use faris_llm::MockProvider;
    use std::sync::Arc;
    use std::time::Duration;

    fn decomposer(provider: MockProvider) -> Decomposer<MockProvider> {
        let reasoner = Reasoner::new(Arc::new(provider), Duration::from_secs(1));
        Decomposer::new(reasoner, DecomposerConfig::default())
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let request = AnalysisRequest::new("q", "   ", Domain::General);
        let result = decomposer(MockProvider::default()).decompose(&request).await;
        assert_eq!(result, Err(DecomposerError::EmptyAnswer));
    }

    #[tokio::test]
    async fn test_answer_too_long() {
        let request = AnalysisRequest::new("q", "a".repeat(60_000), Domain::General);
        let result = decomposer(MockProvider::default()).decompose(&request).await;
        assert!(matches!(result, Err(DecomposerError::AnswerTooLong(60_000, 50_000))));
    }

    #[tokio::test]
    async fn test_backend_claims_are_used() {
        let provider = MockProvider::new(
            r#"{"claims": [{"claim_text": "Paris is the capital of France"}], "reasoning_chain": ["geography"]}"#,
        );
        let request = AnalysisRequest::new(
            "What is the capital of France?",
            "Paris is the capital of France.",
            Domain::General,
        );

        let result = decomposer(provider).decompose(&request).await.unwrap();
        assert_eq!(result.source, DecompositionSource::Backend);
        assert_eq!(result.claims.len(), 1);
        assert_eq!(result.reasoning_chain, vec!["geography"]);
        assert!(!result.is_degraded());
    }
}
