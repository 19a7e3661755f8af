//! Pipeline orchestration
//!
//! ```text
//! received → decomposing → detecting → aggregating → scoring → complete
//!               │              │ (six detectors        │ (score, explain and
//!               │              │  in parallel)         │  recommend in parallel)
//!               └──────────────┴──────── failed ───────┘
//! ```
//!
//! Only decomposition failure, every detector failing, precheck rejection
//! and a deadline that expires before detection abort an analysis. Every
//! other problem is recorded as a degradation on the result.

use crate::collaborator::blocking_call;
use crate::config::EngineConfig;
use crate::error::AnalysisError;
use crate::explainer::{self, Explainer};
use crate::metrics::EngineMetrics;
use crate::precheck::precheck;
use crate::recommender::Recommender;
use crate::state::AnalysisState;
use faris_decomposer::Decomposer;
use faris_detectors::{AnalysisSnapshot, DetectorError, DetectorOutput, DetectorRegistry};
use faris_domain::traits::{CaseSink, ReasoningBackend, SimilarityStore};
use faris_domain::{
    AnalysisRequest, AnalysisResult, AnswerKind, CaseId, ClaimId, Degradation, Explanation,
    FailureFinding, FailurePattern, PipelineStage,
};
use faris_llm::Reasoner;
use faris_scoring::{Aggregator, RiskScorer};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, error, info, warn};

/// How one detector branch ended
#[derive(Debug)]
enum DetectorOutcome {
    Completed(DetectorOutput),
    Failed(String),
    TimedOut(String),
    Cancelled,
}

/// Runs analyses end to end
///
/// Holds everything a request needs: the decomposer, the registered
/// detectors, the scoring configuration and the optional collaborators.
/// One orchestrator serves any number of concurrent `analyze` calls.
///
/// # Examples
///
/// ```no_run
/// use faris_domain::{AnalysisRequest, Domain};
/// use faris_engine::{EngineConfig, Orchestrator};
/// use faris_llm::MockProvider;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let orchestrator = Orchestrator::new(Arc::new(MockProvider::default()), EngineConfig::default())?;
/// let result = orchestrator
///     .analyze(AnalysisRequest::new(
///         "What are the side effects of aspirin?",
///         "Aspirin has no side effects and is completely safe for everyone.",
///         Domain::Medical,
///     ))
///     .await?;
/// println!("{}", result.risk_assessment.summary);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator<B> {
    config: EngineConfig,
    decomposer: Decomposer<B>,
    registry: DetectorRegistry,
    aggregator: Aggregator,
    scorer: RiskScorer,
    explainer: Explainer<B>,
    recommender: Recommender,
    similarity: Option<Arc<dyn SimilarityStore>>,
    sink: Option<Arc<dyn CaseSink>>,
    metrics: Arc<Mutex<EngineMetrics>>,
}

impl<B> Orchestrator<B>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    /// Build an orchestrator with the six standard detectors
    pub fn new(backend: Arc<B>, config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate().map_err(AnalysisError::Config)?;

        let reasoner = Reasoner::new(backend, config.backend_call_timeout())
            .with_enabled(config.use_reasoning_backend);

        Ok(Self {
            decomposer: Decomposer::new(reasoner.clone(), config.decomposer()),
            registry: DetectorRegistry::standard(reasoner.clone()),
            aggregator: Aggregator::from_config(&config.scoring),
            scorer: RiskScorer::new(config.scoring.clone()),
            explainer: Explainer::new(reasoner),
            recommender: Recommender::new(
                config.max_recommendations_per_type,
                config.scoring.severity_weights.clone(),
            ),
            similarity: None,
            sink: None,
            metrics: Arc::new(Mutex::new(EngineMetrics::new())),
            config,
        })
    }

    /// Replace the detector registry
    pub fn with_registry(mut self, registry: DetectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Attach a similarity store for similar past failures and pattern recording
    pub fn with_similarity_store(mut self, store: Arc<dyn SimilarityStore>) -> Self {
        self.explainer = self.explainer.with_similarity_store(
            Arc::clone(&store),
            self.config.similar_failures_k,
            self.config.store_call_timeout(),
        );
        self.similarity = Some(store);
        self
    }

    /// Attach a sink that receives every completed result
    pub fn with_case_sink(mut self, sink: Arc<dyn CaseSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The registered detectors
    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    /// Snapshot of the metrics collected so far
    pub fn metrics(&self) -> EngineMetrics {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn update_metrics(&self, update: impl FnOnce(&mut EngineMetrics)) {
        // A poisoned lock only costs this update
        if let Ok(mut metrics) = self.metrics.lock() {
            update(&mut metrics);
        }
    }

    /// Analyse one request
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let case_id = CaseId::new();
        info!(
            "Analysis {} accepted: {} domain, {} char answer",
            case_id,
            request.domain,
            request.answer.len()
        );

        let outcome = self.run(case_id, request).await;
        let runtime_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(result) => {
                info!(
                    "Analysis {} complete: score {:.3} ({}), {} findings{}",
                    case_id,
                    result.risk_assessment.score,
                    result.risk_assessment.level,
                    result.failures.len(),
                    if result.degraded { ", degraded" } else { "" }
                );
                self.update_metrics(|m| {
                    m.record_completed(result.degraded, runtime_ms);
                    m.record_dropped(result.metadata.dropped_findings);
                    for finding in &result.failures {
                        m.record_finding(finding.failure_type);
                    }
                });
            }
            Err(e) => {
                error!("Analysis {} failed: {}", case_id, e);
                self.update_metrics(|m| m.record_failed(runtime_ms));
            }
        }
        outcome
    }

    async fn run(&self, case_id: CaseId, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let deadline = Instant::now() + self.config.deadline();
        let mut state = AnalysisState::new(case_id, request);

        if self.config.precheck {
            match precheck(state.request()) {
                Ok(kind) => {
                    if kind == AnswerKind::Refusal {
                        info!("Case {}: answer is a refusal", case_id);
                    }
                    state.set_answer_kind(kind);
                }
                Err(e) => return Err(fail(&mut state, e)),
            }
        }

        // Decomposition
        state.advance(PipelineStage::Decomposing);
        let decomposed = timeout_at(deadline, self.decomposer.decompose(state.request())).await;
        let decomposition = match decomposed {
            Ok(Ok(decomposition)) => decomposition,
            Ok(Err(e)) => return Err(fail(&mut state, e.into())),
            Err(_) => {
                return Err(fail(
                    &mut state,
                    AnalysisError::DeadlineExceeded(PipelineStage::Decomposing),
                ))
            }
        };
        info!(
            "Case {}: {} claims via {:?}",
            case_id,
            decomposition.claims.len(),
            decomposition.source
        );
        state.set_decomposition(decomposition);

        if Instant::now() >= deadline {
            return Err(fail(
                &mut state,
                AnalysisError::DeadlineExceeded(PipelineStage::Decomposing),
            ));
        }

        // Detection fan-out
        state.advance(PipelineStage::Detecting);
        let outcomes = self.detect(&state.snapshot(), deadline).await;
        let mut succeeded = 0;
        for (name, outcome) in outcomes {
            match outcome {
                DetectorOutcome::Completed(output) => {
                    succeeded += 1;
                    debug!(
                        "Case {}: {} reported {} findings",
                        case_id,
                        name,
                        output.findings.len()
                    );
                    state.add_detector_output(output.findings, output.verdicts);
                }
                DetectorOutcome::Failed(reason) => {
                    self.update_metrics(|m| m.record_detector_failure(name));
                    state.degrade(PipelineStage::Detecting, name, reason);
                }
                DetectorOutcome::TimedOut(reason) => {
                    self.update_metrics(|m| m.record_detector_timeout(name));
                    state.degrade(PipelineStage::Detecting, name, reason);
                }
                DetectorOutcome::Cancelled => {
                    state.degrade(PipelineStage::Detecting, name, "cancelled at request deadline");
                }
            }
        }
        if !self.registry.is_empty() && succeeded == 0 {
            return Err(fail(
                &mut state,
                AnalysisError::AllDetectorsFailed(self.registry.len()),
            ));
        }
        state.apply_verdicts();
        state.escalate_paired_overconfidence(self.config.scoring.min_finding_confidence);

        // Aggregation
        state.advance(PipelineStage::Aggregating);
        let raw = state.take_raw_findings();
        let raw_count = raw.len();
        let known: Vec<ClaimId> = state.claims().iter().map(|c| c.id).collect();
        let aggregated = self.aggregator.aggregate(raw, &known);
        info!(
            "Case {}: {} raw findings aggregated into {} ({} below threshold, {} invalid)",
            case_id,
            raw_count,
            aggregated.findings.len(),
            aggregated.below_threshold,
            aggregated.violations.len()
        );
        state.set_aggregated(aggregated);

        // Scoring, explanation and recommendations fan-out
        state.advance(PipelineStage::Scoring);
        let domain = state.request().domain;
        let (risk, (explanation, explain_degradations), recommendations) = {
            let findings = &state.aggregated().findings;
            let request = state.request();
            tokio::join!(
                async { self.scorer.score(findings, domain) },
                self.explain_within(request, findings, deadline),
                async { self.recommender.recommend(findings) },
            )
        };
        state.extend_degradations(explain_degradations);

        if self.config.record_patterns {
            self.record_patterns(&mut state).await;
        }

        let result = state.finish(risk, explanation, recommendations);
        self.store(&result).await;
        Ok(result)
    }

    /// Run every registered detector concurrently
    ///
    /// Outcomes come back in registration order regardless of completion
    /// order. Branches still running at the deadline are aborted.
    async fn detect(
        &self,
        snapshot: &AnalysisSnapshot,
        deadline: Instant,
    ) -> Vec<(&'static str, DetectorOutcome)> {
        let detectors = self.registry.detectors();
        let limit = self.config.detector_timeout();
        let mut outcomes: Vec<Option<DetectorOutcome>> = detectors.iter().map(|_| None).collect();

        let mut tasks = JoinSet::new();
        for (index, detector) in detectors.iter().enumerate() {
            let detector = Arc::clone(detector);
            let snapshot = snapshot.clone();
            tasks.spawn(async move {
                let outcome = match timeout(limit, detector.detect(&snapshot)).await {
                    Ok(Ok(output)) => DetectorOutcome::Completed(output),
                    Ok(Err(e @ DetectorError::Timeout(_))) => DetectorOutcome::TimedOut(e.to_string()),
                    Ok(Err(e)) => DetectorOutcome::Failed(e.to_string()),
                    Err(_) => DetectorOutcome::TimedOut(format!("detector timed out after {:?}", limit)),
                };
                (index, outcome)
            });
        }

        let mut cut_off = false;
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, outcome)))) => outcomes[index] = Some(outcome),
                Ok(Some(Err(e))) => warn!("Detector task did not complete: {}", e),
                Ok(None) => break,
                Err(_) => {
                    warn!("Request deadline reached with {} detectors running", tasks.len());
                    tasks.abort_all();
                    cut_off = true;
                    break;
                }
            }
        }

        detectors
            .iter()
            .zip(outcomes)
            .map(|(detector, outcome)| {
                let outcome = outcome.unwrap_or(if cut_off {
                    DetectorOutcome::Cancelled
                } else {
                    DetectorOutcome::Failed("detector task aborted".to_string())
                });
                (detector.name(), outcome)
            })
            .collect()
    }

    /// Explain, falling back to the template once the deadline has passed
    ///
    /// Similar failures and store degradations found before the deadline are
    /// kept even when the prose falls back. A lookup cut off mid-way reports
    /// only the deadline.
    async fn explain_within(
        &self,
        request: &AnalysisRequest,
        findings: &[FailureFinding],
        deadline: Instant,
    ) -> (Explanation, Vec<Degradation>) {
        let deadline_reached = |component: &str, reason: &str| Degradation {
            stage: PipelineStage::Scoring,
            component: component.to_string(),
            reason: reason.to_string(),
        };
        let mut degradations = Vec::new();

        let similar = match timeout_at(deadline, self.explainer.similar_failures(findings)).await {
            Ok((similar, store_degradations)) => {
                degradations.extend(store_degradations);
                similar
            }
            Err(_) => {
                degradations.push(deadline_reached(
                    explainer::STORE_COMPONENT,
                    "request deadline reached during similar failure lookup",
                ));
                Vec::new()
            }
        };

        let mut explanation = if Instant::now() >= deadline {
            degradations.push(deadline_reached(
                explainer::COMPONENT,
                "request deadline reached before explanation",
            ));
            Explainer::<B>::template(findings)
        } else {
            match timeout_at(deadline, self.explainer.narrate(request, findings)).await {
                Ok((explanation, fallback)) => {
                    degradations.extend(fallback);
                    explanation
                }
                Err(_) => {
                    degradations.push(deadline_reached(
                        explainer::COMPONENT,
                        "request deadline reached during explanation",
                    ));
                    Explainer::<B>::template(findings)
                }
            }
        };

        Explainer::<B>::attach_similar(&mut explanation, similar);
        (explanation, degradations)
    }

    /// Append one pattern per surviving finding to the similarity store
    async fn record_patterns(&self, state: &mut AnalysisState) {
        let Some(store) = &self.similarity else {
            return;
        };
        let patterns: Vec<FailurePattern> = state
            .aggregated()
            .findings
            .iter()
            .map(|f| FailurePattern {
                case_id: state.case_id(),
                failure_type: f.failure_type,
                severity: f.severity,
                description: f.description.clone(),
                question: state.request().question.clone(),
            })
            .collect();

        let count = patterns.len();
        for pattern in patterns {
            let store = Arc::clone(store);
            let appended = blocking_call(self.config.store_call_timeout(), move || {
                store.append(pattern).map_err(|e| e.to_string())
            })
            .await;
            if let Err(reason) = appended {
                state.degrade(PipelineStage::Scoring, explainer::STORE_COMPONENT, reason);
            }
        }
        debug!("Case {}: recorded {} failure patterns", state.case_id(), count);
    }

    /// Hand the finished result to the case sink
    ///
    /// The result is final at this point, so a sink failure is logged and
    /// counted rather than recorded on it.
    async fn store(&self, result: &AnalysisResult) {
        let Some(sink) = &self.sink else {
            return;
        };
        let sink = Arc::clone(sink);
        let copy = result.clone();
        let stored = blocking_call(self.config.store_call_timeout(), move || {
            sink.store_result(&copy).map_err(|e| e.to_string())
        })
        .await;
        if let Err(reason) = stored {
            warn!("Failed to store case {}: {}", result.case_id, reason);
            self.update_metrics(|m| m.record_sink_failure());
        }
    }
}

fn fail(state: &mut AnalysisState, error: AnalysisError) -> AnalysisError {
    state.advance(PipelineStage::Failed);
    error
}
