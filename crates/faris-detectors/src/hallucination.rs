//! Hallucination detection
//!
//! Flags claims that are fabricated or unsupported by the supplied context.
//! This is the only detector that assigns claim verdicts.
//!
//! Heuristics (always on):
//! - citation-like text (`et al.`, `(2019)`, `doi:`, `journal of`) that the
//!   context does not contain
//! - appeals to unnamed research (`studies show`, `research shows`)
//! - percentages missing from a supplied context
//!
//! Backend judgment: one verdict per claim, with a confidence and reason.
//! A confidently false (≥ 0.8) safety- or fact-critical claim is critical.

use crate::detector::{Detector, DetectorOutput};
use crate::error::DetectorError;
use crate::judge;
use crate::snapshot::AnalysisSnapshot;
use crate::text::{contains_term, find_terms};
use async_trait::async_trait;
use faris_domain::traits::ReasoningBackend;
use faris_domain::{Claim, ClaimVerdict, FailureFinding, FailureType, Severity, Verdict};
use faris_llm::json::{bool_field, str_field};
use faris_llm::Reasoner;
use serde_json::Value;
use std::fmt::Display;
use tracing::debug;

/// Marker the hallucination prompt starts with
pub const TASK_HEADER: &str = "TASK: verify claims for hallucination";

const CRITICAL_CONFIDENCE: f64 = 0.8;
const HIGH_CONFIDENCE: f64 = 0.7;

const CITATION_MARKERS: &[&str] = &["et al.", "doi:", "journal of", "published in", "ibid"];

const UNNAMED_RESEARCH: &[&str] = &[
    "studies show",
    "studies have shown",
    "research shows",
    "research has shown",
    "scientists say",
    "experts agree",
];

const SAFETY_TERMS: &[&str] = &[
    "safe",
    "unsafe",
    "side effects",
    "dose",
    "dosage",
    "overdose",
    "toxic",
    "lethal",
    "fatal",
    "medication",
    "drug",
    "illegal",
    "lawsuit",
    "invest",
    "guaranteed return",
];

/// Whether a wrong claim here can cause direct harm
fn is_safety_critical(snapshot: &AnalysisSnapshot, claim: &Claim) -> bool {
    snapshot.domain().is_high_stakes() || !find_terms(&claim.text, SAFETY_TERMS).is_empty()
}

/// Severity for a claim judged false with `confidence`
pub fn severity_for(critical: bool, confidence: f64) -> Severity {
    if critical && confidence >= CRITICAL_CONFIDENCE {
        Severity::Critical
    } else if confidence >= HIGH_CONFIDENCE {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// `(2019)`-style parenthesised years
fn has_year_citation(text: &str) -> bool {
    text.match_indices('(').any(|(start, _)| {
        let rest = text[start + 1..].as_bytes();
        rest.len() >= 5
            && rest[..4].iter().all(u8::is_ascii_digit)
            && (rest.starts_with(b"19") || rest.starts_with(b"20"))
            && rest[4] == b')'
    })
}

/// Percent figures such as `37%` or `12.5%`
fn percentages(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !(c.is_ascii_digit() || c == '%' || c == '.'))
                .trim_end_matches('.')
        })
        .filter(|w| {
            w.strip_suffix('%')
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit() || c == '.'))
        })
        .map(str::to_string)
        .collect()
}

fn heuristic_findings(snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    let context = snapshot.context().unwrap_or("");
    let mut findings = Vec::new();

    for claim in snapshot.claims() {
        let cites = !find_terms(&claim.text, CITATION_MARKERS).is_empty() || has_year_citation(&claim.text);
        if cites && !context.contains(claim.text.trim_end_matches('.')) {
            findings.push(
                FailureFinding::new(
                    FailureType::Hallucination,
                    Severity::Medium,
                    0.6,
                    format!("Claim {} cites a source that cannot be verified", claim.id),
                )
                .with_claims([claim.id])
                .with_evidence(claim.text.clone()),
            );
            continue;
        }

        let appeals = find_terms(&claim.text, UNNAMED_RESEARCH);
        if let Some(appeal) = appeals.first() {
            findings.push(
                FailureFinding::new(
                    FailureType::Hallucination,
                    Severity::Medium,
                    0.55,
                    format!("Claim {} appeals to unnamed research (\"{}\")", claim.id, appeal),
                )
                .with_claims([claim.id])
                .with_evidence(claim.text.clone()),
            );
            continue;
        }

        if !context.is_empty() {
            let missing: Vec<String> = percentages(&claim.text)
                .into_iter()
                .filter(|p| !contains_term(context, p))
                .collect();
            if !missing.is_empty() {
                findings.push(
                    FailureFinding::new(
                        FailureType::Hallucination,
                        Severity::Medium,
                        0.6,
                        format!("Claim {} states figures not found in the context", claim.id),
                    )
                    .with_claims([claim.id])
                    .with_evidence(format!("Unsupported figures: {}", missing.join(", "))),
                );
            }
        }
    }

    findings
}

fn build_prompt(snapshot: &AnalysisSnapshot) -> String {
    let context = snapshot
        .context()
        .map(|c| format!("CONTEXT:\n{}\n\n", c))
        .unwrap_or_default();

    format!(
        "{header}\n\nDOMAIN: {domain}\n\nQUESTION:\n{question}\n\n{context}CLAIMS:\n{claims}\n\n\
For each claim decide whether it is fabricated, false, or unsupported by the context \
and general knowledge.\n\n\
Return JSON: {{\"findings\": [{{\"claim_id\": \"c1\", \"is_hallucinated\": true, \
\"verdict\": \"true|false|partial|unverified\", \"confidence\": 0.0-1.0, \
\"reason\": \"...\", \"evidence\": \"...\"}}]}}",
        header = TASK_HEADER,
        domain = snapshot.domain(),
        question = snapshot.question(),
        context = context,
        claims = snapshot.claims_block(),
    )
}

fn apply_judgment(judgment: &Value, snapshot: &AnalysisSnapshot, output: &mut DetectorOutput) {
    for item in judge::findings(judgment) {
        let ids = judge::claim_ids(item, snapshot);
        let Some(claim) = ids.first().and_then(|id| snapshot.claim(*id)) else {
            debug!("Skipping hallucination judgment without a known claim");
            continue;
        };

        let explicit = str_field(item, "verdict").and_then(Verdict::parse);
        let hallucinated = bool_field(item, "is_hallucinated").unwrap_or(explicit == Some(Verdict::False));
        let verdict = explicit.unwrap_or(if hallucinated { Verdict::False } else { Verdict::True });
        output.verdicts.push(ClaimVerdict {
            claim_id: claim.id,
            verdict,
        });

        if !hallucinated {
            continue;
        }

        let confidence = judge::confidence(item);
        let severity = severity_for(is_safety_critical(snapshot, claim), confidence);
        let reason = str_field(item, "reason").unwrap_or("unsupported by context or known facts");
        let mut finding = FailureFinding::new(
            FailureType::Hallucination,
            severity,
            confidence,
            format!("Claim {} is likely false: {}", claim.id, reason),
        )
        .with_claims([claim.id])
        .with_evidence(claim.text.clone());
        if let Some(evidence) = str_field(item, "evidence") {
            finding = finding.with_evidence(evidence);
        }
        output.findings.push(finding);
    }
}

/// Detects fabricated or unsupported claims
pub struct HallucinationDetector<B> {
    reasoner: Reasoner<B>,
}

impl<B> HallucinationDetector<B> {
    /// Create a detector judging through `reasoner`
    pub fn new(reasoner: Reasoner<B>) -> Self {
        Self { reasoner }
    }
}

#[async_trait]
impl<B> Detector for HallucinationDetector<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    fn failure_type(&self) -> FailureType {
        FailureType::Hallucination
    }

    async fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<DetectorOutput, DetectorError> {
        if snapshot.claims().is_empty() {
            return Ok(DetectorOutput::default());
        }

        let mut output = DetectorOutput::findings(heuristic_findings(snapshot));
        if let Some(judgment) = judge::ask(&self.reasoner, &build_prompt(snapshot)).await? {
            apply_judgment(&judgment, snapshot, &mut output);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_domain::{AnalysisRequest, ClaimId, Domain};
    use faris_llm::MockProvider;
    use std::sync::Arc;
    use std::time::Duration;

    fn claims(texts: &[&str]) -> Vec<Claim> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Claim::new(ClaimId::from_ordinal(i as u32 + 1), *t))
            .collect()
    }

    fn detector(provider: MockProvider) -> HallucinationDetector<MockProvider> {
        HallucinationDetector::new(Reasoner::new(Arc::new(provider), Duration::from_secs(1)))
    }

    fn offline() -> HallucinationDetector<MockProvider> {
        HallucinationDetector::new(
            Reasoner::new(Arc::new(MockProvider::default()), Duration::from_secs(1)).with_enabled(false),
        )
    }

    #[test]
    fn test_severity_policy() {
        assert_eq!(severity_for(true, 0.95), Severity::Critical);
        assert_eq!(severity_for(false, 0.95), Severity::High);
        assert_eq!(severity_for(true, 0.75), Severity::High);
        assert_eq!(severity_for(true, 0.5), Severity::Medium);
    }

    #[test]
    fn test_year_citation() {
        assert!(has_year_citation("Smith (2019) found this"));
        assert!(!has_year_citation("Call (555) 1234"));
        assert!(!has_year_citation("in (2019"));
    }

    #[test]
    fn test_percentages() {
        assert_eq!(percentages("About 37% and (12.5%) of cases"), vec!["37%", "12.5%"]);
        assert!(percentages("100 percent").is_empty());
    }

    #[tokio::test]
    async fn test_confident_false_medical_claim_is_critical() {
        let mut provider = MockProvider::default();
        provider.add_rule(
            TASK_HEADER,
            r#"{"findings": [
                {"claim_id": "c1", "is_hallucinated": true, "confidence": 0.95,
                 "reason": "aspirin has well documented side effects"},
                {"claim_id": "c2", "is_hallucinated": false, "confidence": 0.6}
            ]}"#,
        );
        let snapshot = AnalysisSnapshot::from_claims(
            AnalysisRequest::new("What are the side effects of aspirin?", "...", Domain::Medical),
            claims(&["Aspirin has no side effects", "Aspirin is sold over the counter"]),
        );

        let output = detector(provider).detect(&snapshot).await.unwrap();

        assert_eq!(output.findings.len(), 1);
        let finding = &output.findings[0];
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.confidence, 0.95);
        assert_eq!(finding.claim_ids, vec![ClaimId::from_ordinal(1)]);
        assert_eq!(
            output.verdicts,
            vec![
                ClaimVerdict { claim_id: ClaimId::from_ordinal(1), verdict: Verdict::False },
                ClaimVerdict { claim_id: ClaimId::from_ordinal(2), verdict: Verdict::True },
            ]
        );
    }

    #[tokio::test]
    async fn test_general_domain_false_claim_is_high() {
        let provider = MockProvider::new(
            r#"{"findings": [{"claim_id": "c1", "is_hallucinated": true, "confidence": 0.9}]}"#,
        );
        let snapshot = AnalysisSnapshot::from_claims(
            AnalysisRequest::new("Who painted it?", "...", Domain::General),
            claims(&["The Mona Lisa was painted by Picasso"]),
        );

        let output = detector(provider).detect(&snapshot).await.unwrap();
        assert_eq!(output.findings[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_heuristics_flag_unverifiable_citation() {
        let snapshot = AnalysisSnapshot::from_claims(
            AnalysisRequest::new("q", "...", Domain::General),
            claims(&["Smith et al. proved that coffee cures colds", "Coffee is a drink"]),
        );

        let output = offline().detect(&snapshot).await.unwrap();

        assert_eq!(output.findings.len(), 1);
        assert_eq!(output.findings[0].claim_ids, vec![ClaimId::from_ordinal(1)]);
        assert!(output.verdicts.is_empty());
    }

    #[tokio::test]
    async fn test_figures_checked_against_context() {
        let request = AnalysisRequest::new("q", "...", Domain::Finance)
            .with_context("Revenue grew 12% last year.");
        let snapshot = AnalysisSnapshot::from_claims(
            request,
            claims(&["Revenue grew 12% last year", "Margins rose 40% as well"]),
        );

        let output = offline().detect(&snapshot).await.unwrap();

        assert_eq!(output.findings.len(), 1);
        assert_eq!(output.findings[0].claim_ids, vec![ClaimId::from_ordinal(2)]);
    }

    #[tokio::test]
    async fn test_no_claims_no_backend_call() {
        let provider = MockProvider::default();
        let snapshot = AnalysisSnapshot::from_claims(AnalysisRequest::new("q", "a", Domain::Code), vec![]);

        let output = detector(provider.clone()).detect(&snapshot).await.unwrap();

        assert!(output.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_error_fails_detector() {
        let mut provider = MockProvider::default();
        provider.add_error_rule(TASK_HEADER);
        let snapshot = AnalysisSnapshot::from_claims(
            AnalysisRequest::new("q", "a", Domain::General),
            claims(&["Something happened"]),
        );

        let err = detector(provider).detect(&snapshot).await.unwrap_err();
        assert!(matches!(err, DetectorError::Backend(_)));
    }
}
