//! Integration tests for the Decomposer

use crate::{Decomposer, DecomposerConfig, DecompositionSource, TASK_HEADER};
use faris_domain::{AnalysisRequest, ClaimType, Domain};
use faris_llm::{MockProvider, Reasoner};
use std::sync::Arc;
use std::time::Duration;

const ASPIRIN_ANSWER: &str = "Aspirin has no side effects and is completely safe for everyone.";

fn aspirin() -> AnalysisRequest {
    AnalysisRequest::new("What are the side effects of aspirin?", ASPIRIN_ANSWER, Domain::Medical)
}

fn decomposer_with(provider: MockProvider, timeout_ms: u64) -> Decomposer<MockProvider> {
    let reasoner = Reasoner::new(Arc::new(provider), Duration::from_millis(timeout_ms));
    Decomposer::new(reasoner, DecomposerConfig::default())
}

#[tokio::test]
async fn test_full_decomposition_flow() {
    let mut provider = MockProvider::default();
    provider.add_rule(
        TASK_HEADER,
        r#"{
            "claims": [
                {"claim_text": "Aspirin is completely safe for everyone", "claim_type": "factual"},
                {"claim_text": "Aspirin has no side effects", "claim_type": "factual",
                 "implicit_assumptions": ["typical dosage"]}
            ],
            "overall_assumptions": ["the reader is an adult"]
        }"#,
    );

    let result = decomposer_with(provider.clone(), 1_000)
        .decompose(&aspirin())
        .await
        .unwrap();

    assert_eq!(result.source, DecompositionSource::Backend);
    assert_eq!(result.claims.len(), 2);
    // "no side effects" precedes "completely safe" in the answer
    assert_eq!(result.claims[0].text, "Aspirin has no side effects");
    assert_eq!(result.claims[0].id.to_string(), "c1");
    assert_eq!(result.claims[0].implicit_assumptions, vec!["typical dosage"]);
    assert_eq!(result.assumptions, vec!["the reader is an adult"]);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_invalid_json_falls_back_to_sentences() {
    let provider = MockProvider::new("I cannot do that.");
    let request = AnalysisRequest::new(
        "Tell me about Rust.",
        "Rust is a systems language. It guarantees memory safety without a garbage collector.",
        Domain::Code,
    );

    let result = decomposer_with(provider, 1_000).decompose(&request).await.unwrap();

    assert_eq!(result.source, DecompositionSource::SentenceSplit);
    assert!(result.is_degraded());
    assert_eq!(result.claims.len(), 2);
    assert!(result.claims.iter().all(|c| c.claim_type == ClaimType::Factual));
}

#[tokio::test]
async fn test_backend_error_falls_back() {
    let mut provider = MockProvider::default();
    provider.add_error_rule(TASK_HEADER);

    let result = decomposer_with(provider, 1_000).decompose(&aspirin()).await.unwrap();

    assert_eq!(result.source, DecompositionSource::SentenceSplit);
    assert!(result.fallback_reason.unwrap().contains("Backend error"));
    assert_eq!(result.claims.len(), 1);
    assert_eq!(result.claims[0].text, ASPIRIN_ANSWER);
}

#[tokio::test]
async fn test_backend_timeout_falls_back() {
    let mut provider = MockProvider::default();
    provider.add_delayed_rule(TASK_HEADER, Duration::from_millis(500), "{\"claims\": []}");

    let result = decomposer_with(provider, 50).decompose(&aspirin()).await.unwrap();

    assert_eq!(result.source, DecompositionSource::SentenceSplit);
    assert!(result.fallback_reason.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_disabled_backend_is_not_a_degradation() {
    let provider = MockProvider::default();
    let reasoner = Reasoner::new(Arc::new(provider.clone()), Duration::from_secs(1)).with_enabled(false);
    let decomposer = Decomposer::new(reasoner, DecomposerConfig::default());

    let result = decomposer.decompose(&aspirin()).await.unwrap();

    assert_eq!(result.source, DecompositionSource::SentenceSplit);
    assert!(!result.is_degraded());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_backend_may_report_zero_claims() {
    let provider = MockProvider::new(r#"{"claims": []}"#);
    let request = AnalysisRequest::new("Write a sort", "```python\nsorted(xs)\n```", Domain::Code);

    let result = decomposer_with(provider, 1_000).decompose(&request).await.unwrap();

    assert_eq!(result.source, DecompositionSource::Backend);
    assert!(result.claims.is_empty());
}

#[tokio::test]
async fn test_max_claims_respected() {
    let claims: Vec<String> = (1..=30)
        .map(|i| format!("{{\"claim_text\": \"Claim number {}\"}}", i))
        .collect();
    let provider = MockProvider::new(format!("{{\"claims\": [{}]}}", claims.join(",")));
    let reasoner = Reasoner::new(Arc::new(provider), Duration::from_secs(1));
    let decomposer = Decomposer::new(reasoner, DecomposerConfig::default().with_max_claims(5));

    let request = AnalysisRequest::new("q", "A long answer with many claims.", Domain::General);
    let result = decomposer.decompose(&request).await.unwrap();

    assert_eq!(result.claims.len(), 5);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_claims() {
    let provider = MockProvider::new(
        r#"{"claims": [{"claim_text": "B comes second"}, {"claim_text": "A comes first"}]}"#,
    );
    let decomposer = decomposer_with(provider, 1_000);
    let request = AnalysisRequest::new("q", "A comes first. B comes second.", Domain::General);

    let first = decomposer.decompose(&request).await.unwrap();
    let second = decomposer.decompose(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.claims[0].text, "A comes first");
}

#[test]
fn test_blank_answer_rejected_before_backend() {
    let provider = MockProvider::default();
    let decomposer = decomposer_with(provider.clone(), 1_000);
    let request = AnalysisRequest::new("q", "   \n\t", Domain::General);

    let result = tokio_test::block_on(decomposer.decompose(&request));

    assert_eq!(result, Err(crate::DecomposerError::EmptyAnswer));
    assert_eq!(provider.call_count(), 0);
}
