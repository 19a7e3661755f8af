//! Missing-assumption detection
//!
//! Flags claims that lean on prerequisites the question never established.
//! Severity is medium unless the backend reports that the assumption changes
//! whether the claim holds at all.

use crate::detector::{Detector, DetectorOutput};
use crate::error::DetectorError;
use crate::judge;
use crate::snapshot::AnalysisSnapshot;
use crate::text::{content_words, find_terms};
use async_trait::async_trait;
use faris_domain::traits::ReasoningBackend;
use faris_domain::{FailureFinding, FailureType, Severity};
use faris_llm::json::{bool_field, str_field};
use faris_llm::Reasoner;
use serde_json::Value;
use std::fmt::Display;
use tracing::debug;

/// Marker the missing-assumptions prompt starts with
pub const TASK_HEADER: &str = "TASK: find unstated assumptions";

const PRESUMPTION_MARKERS: &[&str] = &[
    "as you know",
    "as mentioned",
    "obviously",
    "of course",
    "simply",
    "just",
    "assuming",
    "given that",
    "clearly",
];

fn marker_findings(snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    snapshot
        .claims()
        .iter()
        .filter_map(|claim| {
            let markers = find_terms(&claim.text, PRESUMPTION_MARKERS);
            (!markers.is_empty()).then(|| {
                FailureFinding::new(
                    FailureType::MissingAssumptions,
                    Severity::Medium,
                    0.55,
                    format!("Claim {} presumes context the question did not give", claim.id),
                )
                .with_claims([claim.id])
                .with_evidence(format!("Presumption markers: {}", markers.join(", ")))
            })
        })
        .collect()
}

/// Implicit assumptions recorded by the decomposer that the question and
/// context never mention
fn unstated_premises(snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    let mut stated = content_words(snapshot.question());
    if let Some(context) = snapshot.context() {
        stated.extend(content_words(context));
    }

    snapshot
        .claims()
        .iter()
        .filter_map(|claim| {
            let missing: Vec<&str> = claim
                .implicit_assumptions
                .iter()
                .filter(|a| {
                    let words = content_words(a);
                    !words.is_empty() && words.iter().all(|w| !stated.contains(w))
                })
                .map(String::as_str)
                .collect();
            (!missing.is_empty()).then(|| {
                FailureFinding::new(
                    FailureType::MissingAssumptions,
                    Severity::Medium,
                    0.5,
                    format!("Claim {} depends on an unstated premise", claim.id),
                )
                .with_claims([claim.id])
                .with_evidence(missing.join("; "))
            })
        })
        .collect()
}

fn build_prompt(snapshot: &AnalysisSnapshot) -> String {
    let known = if snapshot.assumptions().is_empty() {
        String::new()
    } else {
        format!("ASSUMPTIONS ALREADY NOTED:\n- {}\n\n", snapshot.assumptions().join("\n- "))
    };

    format!(
        "{TASK_HEADER}\n\nDOMAIN: {}\n\nQUESTION:\n{}\n\nCLAIMS:\n{}\n\n{}\
List prerequisites the answer relies on that the question does not establish \
(user environment, expertise, jurisdiction, health status, versions).\n\n\
Return JSON: {{\"findings\": [{{\"assumption\": \"...\", \"claim_id\": \"c1\", \
\"impact\": \"...\", \"should_be_stated\": true, \"changes_validity\": false, \
\"confidence\": 0.0-1.0}}]}}",
        snapshot.domain(),
        snapshot.question(),
        snapshot.claims_block(),
        known,
    )
}

fn judged_findings(judgment: &Value, snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    judge::findings(judgment)
        .iter()
        .filter_map(|item| {
            let assumption = str_field(item, "assumption")?;
            if bool_field(item, "should_be_stated") == Some(false) {
                debug!("Assumption '{}' need not be stated", assumption);
                return None;
            }
            let severity = if bool_field(item, "changes_validity").unwrap_or(false) {
                Severity::High
            } else {
                Severity::Medium
            };

            let mut finding = FailureFinding::new(
                FailureType::MissingAssumptions,
                severity,
                judge::confidence(item),
                format!("Unstated assumption: {}", assumption),
            )
            .with_claims(judge::claim_ids(item, snapshot));
            if let Some(impact) = str_field(item, "impact") {
                finding = finding.with_evidence(impact);
            }
            Some(finding)
        })
        .collect()
}

/// Detects reliance on unstated prerequisites
pub struct MissingAssumptionsDetector<B> {
    reasoner: Reasoner<B>,
}

impl<B> MissingAssumptionsDetector<B> {
    /// Create a detector judging through `reasoner`
    pub fn new(reasoner: Reasoner<B>) -> Self {
        Self { reasoner }
    }
}

#[async_trait]
impl<B> Detector for MissingAssumptionsDetector<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    fn failure_type(&self) -> FailureType {
        FailureType::MissingAssumptions
    }

    async fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<DetectorOutput, DetectorError> {
        if snapshot.claims().is_empty() {
            return Ok(DetectorOutput::default());
        }

        let mut findings = marker_findings(snapshot);
        findings.extend(unstated_premises(snapshot));
        if let Some(judgment) = judge::ask(&self.reasoner, &build_prompt(snapshot)).await? {
            findings.extend(judged_findings(&judgment, snapshot));
        }
        Ok(DetectorOutput::findings(findings))
    }
}
