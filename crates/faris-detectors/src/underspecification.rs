//! Underspecification detection
//!
//! Compares what the question asks for with how much actionable detail the
//! answer carries. Findings are low or medium; this detector never reports
//! anything more severe.

use crate::detector::{Detector, DetectorOutput};
use crate::error::DetectorError;
use crate::judge;
use crate::snapshot::AnalysisSnapshot;
use crate::text::{find_terms, has_code, has_list, has_number, words};
use async_trait::async_trait;
use faris_domain::traits::ReasoningBackend;
use faris_domain::{FailureFinding, FailureType, Severity};
use faris_llm::json::{bool_field, str_field, string_list};
use faris_llm::Reasoner;
use serde_json::Value;
use std::fmt::Display;

/// Marker the underspecification prompt starts with
pub const TASK_HEADER: &str = "TASK: check answer specificity";

const PROCEDURAL_MARKERS: &[&str] = &[
    "how do i",
    "how can i",
    "how to",
    "steps",
    "write",
    "implement",
    "configure",
    "set up",
    "install",
];

const PLACEHOLDERS: &[&str] = &["etc.", "and so on", "[insert", "todo", "<your", "something like", "and more"];

const BRIEF_ANSWER_WORDS: usize = 20;

fn clamp(severity: Severity) -> Severity {
    severity.min(Severity::Medium)
}

fn heuristic_findings(snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    let answer = snapshot.answer();
    let mut findings = Vec::new();

    let procedural = !find_terms(snapshot.question(), PROCEDURAL_MARKERS).is_empty();
    let actionable = has_code(answer) || has_list(answer) || has_number(answer);
    if procedural && !actionable && words(answer).len() < BRIEF_ANSWER_WORDS {
        findings.push(
            FailureFinding::new(
                FailureType::Underspecification,
                Severity::Medium,
                0.6,
                "Answer is too brief for a how-to question",
            )
            .with_evidence("No steps, code or concrete values given"),
        );
    }

    let placeholders = find_terms(answer, PLACEHOLDERS);
    if !placeholders.is_empty() {
        findings.push(
            FailureFinding::new(
                FailureType::Underspecification,
                Severity::Low,
                0.5,
                "Answer leaves parts to be filled in",
            )
            .with_evidence(format!("Placeholders: {}", placeholders.join(", "))),
        );
    }

    findings
}

fn build_prompt(snapshot: &AnalysisSnapshot) -> String {
    format!(
        "{TASK_HEADER}\n\nDOMAIN: {}\n\nQUESTION:\n{}\n\nANSWER:\n{}\n\n\
Decide whether the answer gives enough actionable detail for what the question asks. \
Report vague instructions, missing parameters and ambiguities the user would have to \
resolve on their own.\n\n\
Return JSON: {{\"findings\": [{{\"issue\": \"...\", \
\"ambiguity_type\": \"missing_steps|missing_parameters|vague_terms|ambiguous_scope\", \
\"should_clarify\": true, \"claim_id\": \"c1\", \"confidence\": 0.0-1.0}}], \
\"clarifying_questions\": [\"...\"]}}",
        snapshot.domain(),
        snapshot.question(),
        snapshot.answer(),
    )
}

fn judged_findings(judgment: &Value, snapshot: &AnalysisSnapshot) -> Vec<FailureFinding> {
    let questions = string_list(judgment, "clarifying_questions");

    judge::findings(judgment)
        .iter()
        .filter(|item| bool_field(item, "should_clarify") != Some(false))
        .filter_map(|item| {
            let issue = str_field(item, "issue")?;
            let severity = match str_field(item, "ambiguity_type") {
                Some("missing_steps") | Some("missing_parameters") => Severity::Medium,
                _ => Severity::Low,
            };
            let mut finding = FailureFinding::new(
                FailureType::Underspecification,
                clamp(severity),
                judge::confidence(item),
                format!("Underspecified: {}", issue),
            )
            .with_claims(judge::claim_ids(item, snapshot));
            if !questions.is_empty() {
                finding = finding.with_evidence(format!("Clarify: {}", questions.join(" ")));
            }
            Some(finding)
        })
        .collect()
}

/// Detects answers that lack the detail the question needs
pub struct UnderspecificationDetector<B> {
    reasoner: Reasoner<B>,
}

impl<B> UnderspecificationDetector<B> {
    /// Create a detector judging through `reasoner`
    pub fn new(reasoner: Reasoner<B>) -> Self {
        Self { reasoner }
    }
}

#[async_trait]
impl<B> Detector for UnderspecificationDetector<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    fn failure_type(&self) -> FailureType {
        FailureType::Underspecification
    }

    async fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<DetectorOutput, DetectorError> {
        let mut findings = heuristic_findings(snapshot);
        if let Some(judgment) = judge::ask(&self.reasoner, &build_prompt(snapshot)).await? {
            findings.extend(judged_findings(&judgment, snapshot));
        }
        Ok(DetectorOutput::findings(findings))
    }
}
