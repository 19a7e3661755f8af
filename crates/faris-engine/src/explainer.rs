//! Human-readable explanation of aggregated findings
//!
//! The explainer only reads the aggregated findings. Prose comes from the
//! reasoning backend when it is available; any backend trouble falls back to
//! a template built from the findings themselves.

use crate::collaborator::blocking_call;
use faris_domain::traits::{CompletionConstraints, ReasoningBackend, SimilarityStore};
use faris_domain::{
    AnalysisRequest, Degradation, Explanation, ExplanationSource, FailureFinding, FailureType,
    PipelineStage, SimilarFailure,
};
use faris_llm::json::{str_field, string_list};
use faris_llm::Reasoner;
use serde_json::Value;
use std::fmt::{Display, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Header of every explanation prompt
pub const TASK_HEADER: &str = "TASK: explain analysis findings";

const SYSTEM_PROMPT: &str = "You explain the results of an automated failure analysis of an AI answer \
to developers. Only discuss the findings you are given. Respond with JSON only.";

const MAX_KEY_FINDINGS: usize = 5;

/// Component name used in degradations
pub const COMPONENT: &str = "explainer";

/// Component name used for similarity store degradations
pub const STORE_COMPONENT: &str = "similarity_store";

fn finding_line(finding: &FailureFinding) -> String {
    format!(
        "[{}] {} ({:.0}% confidence): {}",
        finding.severity,
        finding.failure_type.display_name(),
        finding.confidence * 100.0,
        finding.description
    )
}

fn failure_type_names(findings: &[FailureFinding]) -> Vec<&'static str> {
    let mut types: Vec<FailureType> = Vec::new();
    for finding in findings {
        if !types.contains(&finding.failure_type) {
            types.push(finding.failure_type);
        }
    }
    types.iter().map(|t| t.display_name()).collect()
}

/// Builds explanations, with or without the reasoning backend
pub struct Explainer<B> {
    reasoner: Reasoner<B>,
    similarity: Option<Arc<dyn SimilarityStore>>,
    similar_k: usize,
    store_timeout: Duration,
}

impl<B> Explainer<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    /// Create an explainer without a similarity store
    pub fn new(reasoner: Reasoner<B>) -> Self {
        Self {
            reasoner,
            similarity: None,
            similar_k: 3,
            store_timeout: Duration::from_secs(2),
        }
    }

    /// Attach a similarity store queried for `k` neighbours per failure type
    pub fn with_similarity_store(
        mut self,
        store: Arc<dyn SimilarityStore>,
        k: usize,
        store_timeout: Duration,
    ) -> Self {
        self.similarity = Some(store);
        self.similar_k = k;
        self.store_timeout = store_timeout;
        self
    }

    /// Explain aggregated findings
    ///
    /// Never fails: backend and store problems are returned as degradations
    /// next to a structurally complete explanation.
    pub async fn explain(
        &self,
        request: &AnalysisRequest,
        findings: &[FailureFinding],
    ) -> (Explanation, Vec<Degradation>) {
        let (similar, mut degradations) = self.similar_failures(findings).await;
        let (mut explanation, fallback) = self.narrate(request, findings).await;
        degradations.extend(fallback);
        Self::attach_similar(&mut explanation, similar);
        (explanation, degradations)
    }

    /// Prose for the findings, from the backend or the template
    ///
    /// A backend failure yields the template plus the degradation recording it.
    pub async fn narrate(
        &self,
        request: &AnalysisRequest,
        findings: &[FailureFinding],
    ) -> (Explanation, Option<Degradation>) {
        if findings.is_empty() || !self.reasoner.is_enabled() {
            return (Self::template(findings), None);
        }
        match self.backend_explanation(request, findings).await {
            Ok(explanation) => (explanation, None),
            Err(reason) => {
                warn!("Explainer falling back to template: {}", reason);
                let degradation = Degradation {
                    stage: PipelineStage::Scoring,
                    component: COMPONENT.to_string(),
                    reason,
                };
                (Self::template(findings), Some(degradation))
            }
        }
    }

    /// List similar past failures in the explanation
    pub fn attach_similar(explanation: &mut Explanation, similar: Vec<SimilarFailure>) {
        if !similar.is_empty() {
            explanation.detailed_analysis.push_str("\n\nSimilar past failures:");
            for s in &similar {
                let _ = write!(
                    explanation.detailed_analysis,
                    "\n- {} ({}, similarity {:.2}): {}",
                    s.failure_type.display_name(),
                    s.severity,
                    s.similarity,
                    s.description
                );
            }
        }
        explanation.similar_failures = similar;
    }

    /// Explanation built from the findings alone
    pub fn template(findings: &[FailureFinding]) -> Explanation {
        if findings.is_empty() {
            return Explanation {
                summary: "No failures detected in the answer.".to_string(),
                detailed_analysis: "None of the detectors reported a finding above the confidence threshold."
                    .to_string(),
                key_findings: Vec::new(),
                source: ExplanationSource::Template,
                similar_failures: Vec::new(),
            };
        }

        let summary = format!(
            "Analysis detected {} potential issue(s): {}.",
            findings.len(),
            failure_type_names(findings).join(", ")
        );

        let mut detailed = String::new();
        for (i, finding) in findings.iter().enumerate() {
            if i > 0 {
                detailed.push('\n');
            }
            let _ = write!(detailed, "{}. {}", i + 1, finding_line(finding));
            if !finding.claim_ids.is_empty() {
                let ids: Vec<String> = finding.claim_ids.iter().map(|c| c.to_string()).collect();
                let _ = write!(detailed, "\n   Claims: {}", ids.join(", "));
            }
            for evidence in &finding.evidence {
                let _ = write!(detailed, "\n   Evidence: {}", evidence);
            }
        }

        let key_findings = findings
            .iter()
            .take(MAX_KEY_FINDINGS)
            .map(|f| format!("{}: {}", f.failure_type.display_name(), f.description))
            .collect();

        Explanation {
            summary,
            detailed_analysis: detailed,
            key_findings,
            source: ExplanationSource::Template,
            similar_failures: Vec::new(),
        }
    }

    fn prompt(request: &AnalysisRequest, findings: &[FailureFinding]) -> String {
        let mut prompt = format!(
            "{}\n\nDomain: {}\nQuestion: {}\nAnswer: {}\n\nFindings:\n",
            TASK_HEADER, request.domain, request.question, request.answer
        );
        for (i, finding) in findings.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {}", i + 1, finding_line(finding));
        }
        prompt.push_str(
            "\nExplain these findings without adding or removing any. Respond with JSON:\n\
             {\"summary\": \"two sentences\", \"detailed_explanation\": \"a few paragraphs\", \
             \"key_findings\": [\"one line per finding\"]}",
        );
        prompt
    }

    async fn backend_explanation(
        &self,
        request: &AnalysisRequest,
        findings: &[FailureFinding],
    ) -> Result<Explanation, String> {
        let constraints = CompletionConstraints {
            temperature: 0.3,
            ..CompletionConstraints::json_with_system(SYSTEM_PROMPT)
        };
        let value: Value = self
            .reasoner
            .complete_json(&Self::prompt(request, findings), constraints)
            .await
            .map_err(|e| e.to_string())?;

        let summary = str_field(&value, "summary")
            .ok_or_else(|| "explanation has no summary".to_string())?
            .to_string();

        let template = Self::template(findings);
        let detailed_analysis = str_field(&value, "detailed_explanation")
            .map(str::to_string)
            .unwrap_or(template.detailed_analysis);
        let mut key_findings = string_list(&value, "key_findings");
        if key_findings.is_empty() {
            key_findings = template.key_findings;
        }

        debug!("Backend explanation with {} key findings", key_findings.len());
        Ok(Explanation {
            summary,
            detailed_analysis,
            key_findings,
            source: ExplanationSource::Backend,
            similar_failures: Vec::new(),
        })
    }

    /// Query the similarity store once per failure type
    pub async fn similar_failures(&self, findings: &[FailureFinding]) -> (Vec<SimilarFailure>, Vec<Degradation>) {
        let mut similar: Vec<SimilarFailure> = Vec::new();
        let mut degradations = Vec::new();
        let Some(store) = &self.similarity else {
            return (similar, degradations);
        };

        let mut seen_types: Vec<FailureType> = Vec::new();
        for finding in findings {
            if seen_types.contains(&finding.failure_type) {
                continue;
            }
            seen_types.push(finding.failure_type);

            let store = Arc::clone(store);
            let text = format!("{}: {}", finding.failure_type.as_str(), finding.description);
            let k = self.similar_k;
            let result = blocking_call(self.store_timeout, move || {
                let embedding = store.embed(&text).map_err(|e| e.to_string())?;
                store.query_similar(&embedding, k).map_err(|e| e.to_string())
            })
            .await;

            match result {
                Ok(found) => {
                    for s in found {
                        let duplicate = similar.iter().any(|existing| {
                            existing.case_id == s.case_id
                                && existing.failure_type == s.failure_type
                                && existing.description == s.description
                        });
                        if !duplicate {
                            similar.push(s);
                        }
                    }
                }
                Err(reason) => {
                    warn!("Similar failure lookup for {} failed: {}", finding.failure_type, reason);
                    degradations.push(Degradation {
                        stage: PipelineStage::Scoring,
                        component: STORE_COMPONENT.to_string(),
                        reason,
                    });
                }
            }
        }
        (similar, degradations)
    }
}
