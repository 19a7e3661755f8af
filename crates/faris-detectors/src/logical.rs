//! Logical-inconsistency detection
//!
//! Heuristics look for claim pairs that say the same thing with opposite
//! polarity and for claims that justify themselves. The backend judges
//! contradictions, circular reasoning and invalid inferences across claims.

use crate::detector::{Detector, DetectorOutput};
use crate::error::DetectorError;
use crate::judge;
use crate::snapshot::AnalysisSnapshot;
use crate::text::{content_words, is_negated, jaccard};
use async_trait::async_trait;
use faris_domain::traits::ReasoningBackend;
use faris_domain::{FailureFinding, FailureType, Severity};
use faris_llm::json::str_field;
use faris_llm::Reasoner;
use serde_json::Value;
use std::fmt::Display;

/// Marker the logical-consistency prompt starts with
pub const TASK_HEADER: &str = "TASK: check claims for logical consistency";

const CONTRADICTION_OVERLAP: f64 = 0.6;
const CIRCULAR_OVERLAP: f64 = 0.8;

fn contradictions(snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    let claims = snapshot.claims();
    let words: Vec<_> = claims.iter().map(|c| content_words(&c.text)).collect();
    let negated: Vec<bool> = claims.iter().map(|c| is_negated(&c.text)).collect();

    let mut findings = Vec::new();
    for i in 0..claims.len() {
        for j in i + 1..claims.len() {
            if negated[i] == negated[j] || jaccard(&words[i], &words[j]) < CONTRADICTION_OVERLAP {
                continue;
            }
            findings.push(
                FailureFinding::new(
                    FailureType::LogicalInconsistency,
                    Severity::High,
                    0.6,
                    format!("Claims {} and {} contradict each other", claims[i].id, claims[j].id),
                )
                .with_claims([claims[i].id, claims[j].id])
                .with_evidence(format!("{} / {}", claims[i].text, claims[j].text)),
            );
        }
    }
    findings
}

fn circular_claims(snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    snapshot
        .claims()
        .iter()
        .filter_map(|claim| {
            let lower = claim.text.to_lowercase();
            let (premise, reason) = lower.split_once(" because ")?;
            let overlap = jaccard(&content_words(premise), &content_words(reason));
            (overlap >= CIRCULAR_OVERLAP).then(|| {
                FailureFinding::new(
                    FailureType::LogicalInconsistency,
                    Severity::Medium,
                    0.55,
                    format!("Claim {} justifies itself", claim.id),
                )
                .with_claims([claim.id])
                .with_evidence(claim.text.clone())
            })
        })
        .collect()
}

fn build_prompt(snapshot: &AnalysisSnapshot) -> String {
    let chain = if snapshot.reasoning_chain().is_empty() {
        String::new()
    } else {
        format!("REASONING CHAIN:\n{}\n\n", snapshot.reasoning_chain().join("\n"))
    };

    format!(
        "{TASK_HEADER}\n\nQUESTION:\n{}\n\nCLAIMS:\n{}\n\n{}\
Identify contradictions between claims, circular reasoning, and conclusions that do not \
follow from their premises.\n\n\
Return JSON: {{\"findings\": [{{\"type\": \"contradiction|circular|invalid_inference\", \
\"description\": \"...\", \"involved_claims\": [\"c1\", \"c2\"], \"explanation\": \"...\", \
\"confidence\": 0.0-1.0}}]}}",
        snapshot.question(),
        snapshot.claims_block(),
        chain,
    )
}

fn judged_findings(judgment: &Value, snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    judge::findings(judgment)
        .iter()
        .map(|item| {
            let kind = str_field(item, "type").unwrap_or("invalid_inference");
            let severity = if kind.eq_ignore_ascii_case("contradiction") {
                Severity::High
            } else {
                Severity::Medium
            };
            let description = judge::text(item, &["description", "explanation"])
                .map(str::to_string)
                .unwrap_or_else(|| format!("Reasoning flaw: {}", kind));

            let mut finding = FailureFinding::new(
                FailureType::LogicalInconsistency,
                severity,
                judge::confidence(item),
                description,
            )
            .with_claims(judge::claim_ids(item, snapshot));
            if let Some(explanation) = str_field(item, "explanation") {
                finding = finding.with_evidence(explanation);
            }
            finding
        })
        .collect()
}

/// Detects contradictions and invalid reasoning between claims
pub struct LogicalInconsistencyDetector<B> {
    reasoner: Reasoner<B>,
}

impl<B> LogicalInconsistencyDetector<B> {
    /// Create a detector judging through `reasoner`
    pub fn new(reasoner: Reasoner<B>) -> Self {
        Self { reasoner }
    }
}

#[async_trait]
impl<B> Detector for LogicalInconsistencyDetector<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    fn failure_type(&self) -> FailureType {
        FailureType::LogicalInconsistency
    }

    async fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<DetectorOutput, DetectorError> {
        if snapshot.claims().is_empty() {
            return Ok(DetectorOutput::default());
        }

        let mut findings = contradictions(snapshot);
        findings.extend(circular_claims(snapshot));

        // A single claim cannot contradict another
        if snapshot.claims().len() > 1 {
            if let Some(judgment) = judge::ask(&self.reasoner, &build_prompt(snapshot)).await? {
                findings.extend(judged_findings(&judgment, snapshot));
            }
        }
        Ok(DetectorOutput::findings(findings))
    }
}
