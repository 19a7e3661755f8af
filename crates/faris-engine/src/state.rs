//! Per-request analysis state
//!
//! Owned by the orchestrator task alone. Parallel branches never see it:
//! they get an [`AnalysisSnapshot`] and hand their outputs back, and the
//! orchestrator writes each slot once after the branch barrier.

use faris_decomposer::Decomposition;
use faris_detectors::AnalysisSnapshot;
use faris_domain::{
    AnalysisMetadata, AnalysisRequest, AnalysisResult, AnswerKind, CaseId, Claim, ClaimVerdict,
    Degradation, Explanation, FailureFinding, FailureType, PipelineStage, Recommendation,
    RiskAssessment, Severity,
};
use faris_scoring::AggregatedFindings;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Mutable state of one analysis as it moves through the pipeline
#[derive(Debug)]
pub struct AnalysisState {
    case_id: CaseId,
    request: Arc<AnalysisRequest>,
    stage: PipelineStage,
    stage_started: Instant,
    answer_kind: AnswerKind,
    claims: Vec<Claim>,
    assumptions: Vec<String>,
    reasoning_chain: Vec<String>,
    raw_findings: Vec<FailureFinding>,
    verdicts: Vec<ClaimVerdict>,
    aggregated: AggregatedFindings,
    degradations: Vec<Degradation>,
    timings: BTreeMap<String, u64>,
}

impl AnalysisState {
    /// Fresh state in the `received` stage
    pub fn new(case_id: CaseId, request: AnalysisRequest) -> Self {
        Self {
            case_id,
            request: Arc::new(request),
            stage: PipelineStage::Received,
            stage_started: Instant::now(),
            answer_kind: AnswerKind::Response,
            claims: Vec::new(),
            assumptions: Vec::new(),
            reasoning_chain: Vec::new(),
            raw_findings: Vec::new(),
            verdicts: Vec::new(),
            aggregated: AggregatedFindings::default(),
            degradations: Vec::new(),
            timings: BTreeMap::new(),
        }
    }

    /// The case being analysed
    pub fn case_id(&self) -> CaseId {
        self.case_id
    }

    /// The analysed request
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// Current stage
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Claims as decomposed, with verdicts once applied
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Aggregated findings, empty before aggregation
    pub fn aggregated(&self) -> &AggregatedFindings {
        &self.aggregated
    }

    /// Recoverable failures so far
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    /// Move to `next`, recording how long the current stage took
    ///
    /// Returns false and stays put when the transition is not allowed.
    pub fn advance(&mut self, next: PipelineStage) -> bool {
        if !self.stage.can_transition_to(next) {
            warn!(
                "Case {}: refusing transition {} -> {}",
                self.case_id, self.stage, next
            );
            return false;
        }
        let elapsed = self.stage_started.elapsed().as_millis() as u64;
        self.timings.insert(self.stage.as_str().to_string(), elapsed);
        info!("Case {}: {} -> {}", self.case_id, self.stage, next);
        self.stage = next;
        self.stage_started = Instant::now();
        true
    }

    /// Record the precheck classification
    pub fn set_answer_kind(&mut self, kind: AnswerKind) {
        self.answer_kind = kind;
    }

    /// Record the decomposition, noting a backend fallback as a degradation
    pub fn set_decomposition(&mut self, decomposition: Decomposition) {
        if let Some(reason) = decomposition.fallback_reason {
            self.degrade(PipelineStage::Decomposing, "decomposer", reason);
        }
        self.claims = decomposition.claims;
        self.assumptions = decomposition.assumptions;
        self.reasoning_chain = decomposition.reasoning_chain;
    }

    /// Immutable view handed to every detector
    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot::new(
            Arc::clone(&self.request),
            self.claims.clone(),
            self.assumptions.clone(),
            self.reasoning_chain.clone(),
        )
    }

    /// Collect one detector's output
    pub fn add_detector_output(&mut self, findings: Vec<FailureFinding>, verdicts: Vec<ClaimVerdict>) {
        self.raw_findings.extend(findings);
        self.verdicts.extend(verdicts);
    }

    /// Apply collected claim verdicts; later verdicts for a claim win
    pub fn apply_verdicts(&mut self) {
        for verdict in std::mem::take(&mut self.verdicts) {
            match self.claims.iter_mut().find(|c| c.id == verdict.claim_id) {
                Some(claim) => claim.verdict = verdict.verdict,
                None => debug!("Ignoring verdict for unknown claim {}", verdict.claim_id),
            }
        }
    }

    /// Raise overconfidence on a hallucinated claim to at least high
    ///
    /// Only hallucination findings at or above `min_confidence` count, since
    /// weaker ones never reach the result. Returns how many findings changed.
    pub fn escalate_paired_overconfidence(&mut self, min_confidence: f64) -> usize {
        let hallucinations: Vec<FailureFinding> = self
            .raw_findings
            .iter()
            .filter(|f| f.failure_type == FailureType::Hallucination && f.confidence >= min_confidence)
            .cloned()
            .collect();

        let mut escalated = 0;
        for finding in &mut self.raw_findings {
            if finding.failure_type == FailureType::Overconfidence
                && finding.severity < Severity::High
                && hallucinations.iter().any(|h| h.overlaps(finding))
            {
                finding.severity = Severity::High;
                escalated += 1;
            }
        }
        if escalated > 0 {
            debug!(
                "Case {}: {} overconfidence findings paired with hallucinations",
                self.case_id, escalated
            );
        }
        escalated
    }

    /// Hand the raw findings to aggregation
    pub fn take_raw_findings(&mut self) -> Vec<FailureFinding> {
        std::mem::take(&mut self.raw_findings)
    }

    /// Record the aggregation output
    pub fn set_aggregated(&mut self, aggregated: AggregatedFindings) {
        self.aggregated = aggregated;
    }

    /// Record a recoverable failure
    pub fn degrade(&mut self, stage: PipelineStage, component: impl Into<String>, reason: impl Into<String>) {
        let degradation = Degradation {
            stage,
            component: component.into(),
            reason: reason.into(),
        };
        warn!(
            "Case {} degraded in {}: {} ({})",
            self.case_id, degradation.stage, degradation.component, degradation.reason
        );
        self.degradations.push(degradation);
    }

    /// Append degradations reported by a component
    pub fn extend_degradations(&mut self, degradations: impl IntoIterator<Item = Degradation>) {
        for d in degradations {
            self.degrade(d.stage, d.component, d.reason);
        }
    }

    /// Assemble the final result and move to `complete`
    pub fn finish(
        mut self,
        risk_assessment: RiskAssessment,
        explanation: Explanation,
        recommendations: Vec<Recommendation>,
    ) -> AnalysisResult {
        self.advance(PipelineStage::Complete);

        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let dropped_findings = self.aggregated.violations.len();
        let request = Arc::try_unwrap(self.request).unwrap_or_else(|shared| (*shared).clone());

        AnalysisResult {
            case_id: self.case_id,
            request,
            failure_detected: self.aggregated.failure_detected,
            failure_types: self.aggregated.failure_types,
            failures: self.aggregated.findings,
            claims: self.claims,
            risk_assessment,
            recommendations,
            explanation,
            degraded: !self.degradations.is_empty(),
            degradations: self.degradations,
            metadata: AnalysisMetadata {
                answer_kind: self.answer_kind,
                dropped_findings,
                assumptions: self.assumptions,
                reasoning_chain: self.reasoning_chain,
                stage_timings_ms: self.timings,
                created_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_decomposer::DecompositionSource;
    use faris_domain::{ClaimId, Domain, Verdict};

    fn state() -> AnalysisState {
        AnalysisState::new(
            CaseId::new(),
            AnalysisRequest::new("Is it safe?", "It is completely safe.", Domain::General),
        )
    }

    fn decomposition(fallback: Option<&str>) -> Decomposition {
        Decomposition {
            claims: vec![
                Claim::new(ClaimId::from_ordinal(1), "It is safe"),
                Claim::new(ClaimId::from_ordinal(2), "It is tested"),
            ],
            assumptions: vec!["adult user".to_string()],
            reasoning_chain: Vec::new(),
            source: DecompositionSource::Backend,
            fallback_reason: fallback.map(str::to_string),
        }
    }

    #[test]
    fn test_stage_transitions() {
        let mut state = state();
        assert!(!state.advance(PipelineStage::Detecting));
        assert_eq!(state.stage(), PipelineStage::Received);

        assert!(state.advance(PipelineStage::Decomposing));
        assert!(state.advance(PipelineStage::Detecting));
        assert_eq!(state.stage(), PipelineStage::Detecting);
        assert!(state.advance(PipelineStage::Failed));
        assert!(!state.advance(PipelineStage::Aggregating));
    }

    #[test]
    fn test_decomposition_fallback_degrades() {
        let mut state = state();
        state.set_decomposition(decomposition(Some("Backend error: down")));
        assert_eq!(state.claims().len(), 2);
        assert_eq!(state.degradations().len(), 1);
        assert_eq!(state.degradations()[0].component, "decomposer");
    }

    #[test]
    fn test_verdicts_applied_in_order() {
        let mut state = state();
        state.set_decomposition(decomposition(None));
        state.add_detector_output(
            Vec::new(),
            vec![
                ClaimVerdict { claim_id: ClaimId::from_ordinal(1), verdict: Verdict::Partial },
                ClaimVerdict { claim_id: ClaimId::from_ordinal(9), verdict: Verdict::True },
                ClaimVerdict { claim_id: ClaimId::from_ordinal(1), verdict: Verdict::False },
            ],
        );
        state.apply_verdicts();

        assert_eq!(state.claims()[0].verdict, Verdict::False);
        assert_eq!(state.claims()[1].verdict, Verdict::Unverified);
    }

    #[test]
    fn test_overconfidence_on_hallucinated_claim_escalates() {
        let c1 = ClaimId::from_ordinal(1);
        let c2 = ClaimId::from_ordinal(2);
        let mut state = state();
        state.set_decomposition(decomposition(None));
        state.add_detector_output(
            vec![
                FailureFinding::new(FailureType::Hallucination, Severity::Critical, 0.9, "false").with_claims([c1]),
                FailureFinding::new(FailureType::Hallucination, Severity::High, 0.3, "weak").with_claims([c2]),
            ],
            Vec::new(),
        );
        state.add_detector_output(
            vec![
                FailureFinding::new(FailureType::Overconfidence, Severity::Medium, 0.8, "c1").with_claims([c1]),
                FailureFinding::new(FailureType::Overconfidence, Severity::Medium, 0.8, "c2").with_claims([c2]),
                FailureFinding::new(FailureType::Overconfidence, Severity::Medium, 0.8, "answer"),
            ],
            Vec::new(),
        );

        assert_eq!(state.escalate_paired_overconfidence(0.5), 1);
        let severities: Vec<(String, Severity)> = state
            .take_raw_findings()
            .into_iter()
            .filter(|f| f.failure_type == FailureType::Overconfidence)
            .map(|f| (f.description, f.severity))
            .collect();
        assert_eq!(
            severities,
            vec![
                ("c1".to_string(), Severity::High),
                ("c2".to_string(), Severity::Medium),
                ("answer".to_string(), Severity::Medium),
            ]
        );
    }

    #[test]
    fn test_snapshot_shares_request() {
        let mut state = state();
        state.set_decomposition(decomposition(None));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.question(), "Is it safe?");
        assert_eq!(snapshot.claims().len(), 2);
        assert_eq!(snapshot.assumptions(), ["adult user".to_string()]);
    }

    #[test]
    fn test_finish_assembles_result() {
        let mut state = state();
        state.set_answer_kind(AnswerKind::Refusal);
        state.set_decomposition(decomposition(None));
        for stage in [
            PipelineStage::Decomposing,
            PipelineStage::Detecting,
            PipelineStage::Aggregating,
            PipelineStage::Scoring,
        ] {
            assert!(state.advance(stage));
        }

        let risk = faris_scoring::RiskScorer::default().score(&[], Domain::General);
        let explanation = crate::Explainer::<faris_llm::MockProvider>::template(&[]);
        let result = state.finish(risk, explanation, Vec::new());

        assert!(!result.failure_detected);
        assert!(!result.degraded);
        assert_eq!(result.claims.len(), 2);
        assert_eq!(result.metadata.answer_kind, AnswerKind::Refusal);
        assert!(result.metadata.stage_timings_ms.contains_key("scoring"));
        assert!(result.metadata.created_at > 0);
    }
}
