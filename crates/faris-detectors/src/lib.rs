//! FARIS Failure Detectors
//!
//! Six independent detectors, one per failure type, behind a single
//! [`Detector`] contract. Each detector combines deterministic lexical
//! heuristics with an optional judgment from the reasoning backend.
//!
//! # Contract
//!
//! - Detectors read an immutable [`AnalysisSnapshot`]; they never write
//!   shared state. Claim verdicts are returned in [`DetectorOutput`] and
//!   applied by the caller after all detectors finish.
//! - A disabled backend means heuristics only. A backend error, timeout or
//!   unusable response fails the detector with a [`DetectorError`], which the
//!   caller treats as "no findings" plus a recorded degradation.
//! - Missing fields in backend output never fail a detector; malformed items
//!   are skipped.
//!
//! # Example Usage
//!
//! ```no_run
//! use faris_detectors::{AnalysisSnapshot, DetectorRegistry};
//! use faris_domain::{AnalysisRequest, Claim, ClaimId, Domain};
//! use faris_llm::{MockProvider, Reasoner};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), faris_detectors::DetectorError> {
//! let reasoner = Reasoner::new(Arc::new(MockProvider::default()), Duration::from_secs(30));
//! let registry = DetectorRegistry::standard(reasoner);
//!
//! let snapshot = AnalysisSnapshot::from_claims(
//!     AnalysisRequest::new("Is it safe?", "It is completely safe.", Domain::Medical),
//!     vec![Claim::new(ClaimId::from_ordinal(1), "It is completely safe")],
//! );
//! for detector in registry.detectors() {
//!     let output = detector.detect(&snapshot).await?;
//!     println!("{}: {} findings", detector.name(), output.findings.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod assumptions;
pub mod hallucination;
pub mod logical;
pub mod overconfidence;
pub mod scope;
pub mod text;
pub mod underspecification;

mod detector;
mod error;
mod judge;
mod registry;
mod snapshot;

pub use assumptions::MissingAssumptionsDetector;
pub use detector::{Detector, DetectorOutput};
pub use error::DetectorError;
pub use hallucination::HallucinationDetector;
pub use judge::CRITIC_SYSTEM_PROMPT;
pub use logical::LogicalInconsistencyDetector;
pub use overconfidence::OverconfidenceDetector;
pub use registry::DetectorRegistry;
pub use scope::ScopeViolationDetector;
pub use snapshot::AnalysisSnapshot;
pub use underspecification::UnderspecificationDetector;
