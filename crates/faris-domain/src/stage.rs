//! Pipeline stages of one analysis

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the analysis state machine
///
/// Requests move forward through:
/// - Received: accepted and prechecked
/// - Decomposing: answer split into claims
/// - Detecting: six detectors fan out over a frozen snapshot
/// - Aggregating: findings merged and ordered
/// - Scoring: risk scoring, explanation and recommendations fan out
/// - Complete: result assembled
///
/// `Failed` is reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// Request accepted
    Received,
    /// Claim decomposition running
    Decomposing,
    /// Detector fan-out running
    Detecting,
    /// Aggregation running
    Aggregating,
    /// Scoring, explaining and recommending running
    Scoring,
    /// Terminal: result available
    Complete,
    /// Terminal: non-recoverable error
    Failed,
}

impl PipelineStage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Decomposing => "decomposing",
            PipelineStage::Detecting => "detecting",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Complete => "complete",
            PipelineStage::Failed => "failed",
        }
    }

    /// The next stage on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            PipelineStage::Received => Some(PipelineStage::Decomposing),
            PipelineStage::Decomposing => Some(PipelineStage::Detecting),
            PipelineStage::Detecting => Some(PipelineStage::Aggregating),
            PipelineStage::Aggregating => Some(PipelineStage::Scoring),
            PipelineStage::Scoring => Some(PipelineStage::Complete),
            PipelineStage::Complete | PipelineStage::Failed => None,
        }
    }

    /// Whether this stage ends the pipeline
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Failed)
    }

    /// Whether moving from `self` to `target` is a legal transition
    pub fn can_transition_to(&self, target: PipelineStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == PipelineStage::Failed || self.next() == Some(target)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_path() {
        let mut stage = PipelineStage::Received;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(stage.can_transition_to(next));
            stage = next;
            visited.push(stage);
        }
        assert_eq!(visited.len(), 6);
        assert_eq!(stage, PipelineStage::Complete);
    }

    #[test]
    fn test_failed_reachable_from_non_terminal() {
        assert!(PipelineStage::Received.can_transition_to(PipelineStage::Failed));
        assert!(PipelineStage::Scoring.can_transition_to(PipelineStage::Failed));
        assert!(!PipelineStage::Complete.can_transition_to(PipelineStage::Failed));
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!PipelineStage::Received.can_transition_to(PipelineStage::Detecting));
        assert!(!PipelineStage::Detecting.can_transition_to(PipelineStage::Scoring));
        assert!(!PipelineStage::Failed.can_transition_to(PipelineStage::Received));
    }
}
