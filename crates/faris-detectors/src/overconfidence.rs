//! Overconfidence detection
//!
//! Absolute-certainty language ("always", "completely safe", "100%") on a
//! claim that carries no hedge is flagged at medium severity. The backend
//! can raise a claim to high by marking it unsupported. Pairing with a
//! hallucination on the same claim is applied by the engine after detection,
//! since one detector never sees another's findings.

use crate::detector::{Detector, DetectorOutput};
use crate::error::DetectorError;
use crate::judge;
use crate::snapshot::AnalysisSnapshot;
use crate::text::find_terms;
use async_trait::async_trait;
use faris_domain::traits::ReasoningBackend;
use faris_domain::{FailureFinding, FailureType, Severity};
use faris_llm::json::{bool_field, str_field};
use faris_llm::Reasoner;
use serde_json::Value;
use std::fmt::Display;

/// Marker the overconfidence prompt starts with
pub const TASK_HEADER: &str = "TASK: assess certainty of claims";

/// Terms that assert certainty
pub const ABSOLUTE_TERMS: &[&str] = &[
    "always",
    "never",
    "completely",
    "totally",
    "entirely",
    "absolutely",
    "definitely",
    "certainly",
    "guaranteed",
    "undoubtedly",
    "without exception",
    "for everyone",
    "100%",
    "perfectly",
    "impossible",
    "no risk",
];

const HEDGES: &[&str] = &[
    "may",
    "might",
    "could",
    "possibly",
    "probably",
    "likely",
    "generally",
    "usually",
    "often",
    "typically",
    "in most cases",
    "can be",
];

const BASE_CONFIDENCE: f64 = 0.55;
const STEP: f64 = 0.1;
const MAX_HEURISTIC_CONFIDENCE: f64 = 0.85;

/// Heuristic confidence for a claim with `terms` absolute terms
pub fn heuristic_confidence(terms: usize) -> f64 {
    let extra = terms.saturating_sub(1) as f64;
    (BASE_CONFIDENCE + STEP * extra).min(MAX_HEURISTIC_CONFIDENCE)
}

fn lexical_findings(snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    snapshot
        .claims()
        .iter()
        .filter(|claim| find_terms(&claim.text, HEDGES).is_empty())
        .filter_map(|claim| {
            let terms = find_terms(&claim.text, ABSOLUTE_TERMS);
            (!terms.is_empty()).then(|| {
                FailureFinding::new(
                    FailureType::Overconfidence,
                    Severity::Medium,
                    heuristic_confidence(terms.len()),
                    format!("Claim {} uses absolute language: {}", claim.id, terms.join(", ")),
                )
                .with_claims([claim.id])
                .with_evidence(claim.text.clone())
            })
        })
        .collect()
}

fn build_prompt(snapshot: &AnalysisSnapshot) -> String {
    format!(
        "{TASK_HEADER}\n\nDOMAIN: {}\n\nQUESTION:\n{}\n\nCLAIMS:\n{}\n\n\
Find claims stated with more certainty than the evidence allows. Mark a claim \
unsupported when its certainty rests on nothing verifiable.\n\n\
Return JSON: {{\"findings\": [{{\"claim_id\": \"c1\", \"text\": \"...\", \"issue\": \"...\", \
\"confidence\": 0.0-1.0, \"unsupported\": false}}], \"absolute_terms_found\": [\"...\"]}}",
        snapshot.domain(),
        snapshot.question(),
        snapshot.claims_block(),
    )
}

fn judged_findings(judgment: &Value, snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    judge::findings(judgment)
        .iter()
        .map(|item| {
            let claim_ids = judge::claim_ids(item, snapshot);
            let severity = if bool_field(item, "unsupported").unwrap_or(false) {
                Severity::High
            } else {
                Severity::Medium
            };
            let issue = str_field(item, "issue").unwrap_or("certainty exceeds the evidence");
            let subject = claim_ids
                .first()
                .map(|id| format!("Claim {}", id))
                .unwrap_or_else(|| "The answer".to_string());

            let mut finding = FailureFinding::new(
                FailureType::Overconfidence,
                severity,
                judge::confidence(item),
                format!("{} is overconfident: {}", subject, issue),
            )
            .with_claims(claim_ids);
            if let Some(text) = str_field(item, "text") {
                finding = finding.with_evidence(text);
            }
            finding
        })
        .collect()
}

/// Detects certainty not backed by evidence
pub struct OverconfidenceDetector<B> {
    reasoner: Reasoner<B>,
}

impl<B> OverconfidenceDetector<B> {
    /// Create a detector judging through `reasoner`
    pub fn new(reasoner: Reasoner<B>) -> Self {
        Self { reasoner }
    }
}

#[async_trait]
impl<B> Detector for OverconfidenceDetector<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    fn failure_type(&self) -> FailureType {
        FailureType::Overconfidence
    }

    async fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<DetectorOutput, DetectorError> {
        if snapshot.claims().is_empty() {
            return Ok(DetectorOutput::default());
        }

        let mut findings = lexical_findings(snapshot);
        if let Some(judgment) = judge::ask(&self.reasoner, &build_prompt(snapshot)).await? {
            findings.extend(judged_findings(&judgment, snapshot));
        }
        Ok(DetectorOutput::findings(findings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_domain::{AnalysisRequest, Claim, ClaimId, Domain};
    use faris_llm::MockProvider;
    use std::sync::Arc;
    use std::time::Duration;

    fn snapshot(texts: &[&str]) -> AnalysisSnapshot {
        let claims = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Claim::new(ClaimId::from_ordinal(i as u32 + 1), *t))
            .collect();
        AnalysisSnapshot::from_claims(AnalysisRequest::new("q", "a", Domain::Medical), claims)
    }

    fn detector(provider: MockProvider, enabled: bool) -> OverconfidenceDetector<MockProvider> {
        OverconfidenceDetector::new(Reasoner::new(Arc::new(provider), Duration::from_secs(1)).with_enabled(enabled))
    }

    #[test]
    fn test_confidence_grows_with_terms_and_caps() {
        assert_eq!(heuristic_confidence(1), 0.55);
        assert!((heuristic_confidence(2) - 0.65).abs() < 1e-9);
        assert_eq!(heuristic_confidence(10), MAX_HEURISTIC_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_absolute_language_flagged() {
        let s = snapshot(&["Aspirin has no side effects", "Aspirin is completely safe for everyone"]);

        let output = detector(MockProvider::default(), false).detect(&s).await.unwrap();

        assert_eq!(output.findings.len(), 1);
        let finding = &output.findings[0];
        assert_eq!(finding.claim_ids, vec![ClaimId::from_ordinal(2)]);
        assert_eq!(finding.severity, Severity::Medium);
        assert!((finding.confidence - 0.65).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_hedged_claims_skipped() {
        let s = snapshot(&["It is usually completely harmless"]);
        let output = detector(MockProvider::default(), false).detect(&s).await.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_claim_is_high() {
        let mut provider = MockProvider::default();
        provider.add_rule(
            TASK_HEADER,
            r#"{"findings": [
                {"claim_id": "c1", "text": "cures everything", "issue": "no evidence",
                 "confidence": 0.8, "unsupported": true}
            ], "absolute_terms_found": ["everything"]}"#,
        );
        let s = snapshot(&["This tea cures everything"]);

        let output = detector(provider, true).detect(&s).await.unwrap();

        assert_eq!(output.findings.len(), 1);
        assert_eq!(output.findings[0].severity, Severity::High);
        assert_eq!(output.findings[0].evidence, vec!["cures everything"]);
    }
}
