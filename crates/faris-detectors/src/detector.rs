//! The detector contract

use crate::error::DetectorError;
use crate::snapshot::AnalysisSnapshot;
use async_trait::async_trait;
use faris_domain::{ClaimVerdict, FailureFinding, FailureType};

/// What one detector run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorOutput {
    /// Findings, all of the detector's own failure type
    pub findings: Vec<FailureFinding>,

    /// Verdicts for claims the detector examined
    pub verdicts: Vec<ClaimVerdict>,
}

impl DetectorOutput {
    /// Output with findings and no verdicts
    pub fn findings(findings: Vec<FailureFinding>) -> Self {
        Self {
            findings,
            verdicts: Vec::new(),
        }
    }

    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// One failure detector
///
/// Detectors read a shared [`AnalysisSnapshot`] and never mutate shared
/// state. Verdicts are returned, not written, so the orchestrator can apply
/// them after every detector has finished.
#[async_trait]
pub trait Detector: Send + Sync {
    /// The failure type this detector reports
    fn failure_type(&self) -> FailureType;

    /// Name used in logs, metrics and degradation records
    fn name(&self) -> &'static str {
        self.failure_type().as_str()
    }

    /// Inspect the snapshot
    async fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<DetectorOutput, DetectorError>;
}
