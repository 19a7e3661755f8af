//! FARIS Analysis Engine
//!
//! Runs the full failure analysis of one LLM answer: precheck, claim
//! decomposition, six concurrent detectors, aggregation, then risk scoring,
//! explanation and recommendations in parallel.
//!
//! # Architecture
//!
//! ```text
//! AnalysisRequest
//!     │
//!     ▼
//! Precheck ──► Decomposer ──► ┌ Hallucination        ┐
//!                             │ LogicalInconsistency │
//!                             │ MissingAssumptions   │ ──► Aggregator ──► ┌ RiskScorer  ┐
//!                             │ Overconfidence       │                    │ Explainer   │ ──► AnalysisResult
//!                             │ ScopeViolation       │                    └ Recommender ┘
//!                             └ Underspecification   ┘
//! ```
//!
//! # Failure semantics
//!
//! An analysis fails only when the answer cannot be decomposed, every
//! detector fails, the precheck rejects the answer, or the request deadline
//! expires before detection starts. Detector errors and timeouts, explainer
//! fallbacks and store failures produce a complete result with
//! `degraded = true` and one [`Degradation`](faris_domain::Degradation) each.
//!
//! # Example Usage
//!
//! ```no_run
//! use faris_domain::{AnalysisRequest, Domain};
//! use faris_engine::{EngineConfig, Orchestrator};
//! use faris_llm::OllamaProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(OllamaProvider::default_endpoint("llama3.1:8b"));
//! let orchestrator = Orchestrator::new(backend, EngineConfig::default())?;
//!
//! let result = orchestrator
//!     .analyze(AnalysisRequest::new(
//!         "What are the side effects of aspirin?",
//!         "Aspirin has no side effects and is completely safe for everyone.",
//!         Domain::Medical,
//!     ))
//!     .await?;
//!
//! println!("{}", result.risk_assessment.summary);
//! for rec in &result.recommendations {
//!     println!("[{}] {}", rec.priority, rec.title);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod catalog;
mod collaborator;
mod config;
mod error;
mod explainer;
mod metrics;
mod orchestrator;
mod precheck;
mod recommender;
mod state;
mod taxonomy;


pub use catalog::{entries_for, CatalogEntry, CATALOG};
pub use config::EngineConfig;
pub use error::AnalysisError;
pub use explainer::{Explainer, TASK_HEADER as EXPLAIN_TASK_HEADER};
pub use metrics::EngineMetrics;
pub use orchestrator::Orchestrator;
pub use precheck::precheck;
pub use recommender::{priority_for, Recommender};
pub use state::AnalysisState;
pub use taxonomy::{taxonomy, taxonomy_entry, TaxonomyEntry};
