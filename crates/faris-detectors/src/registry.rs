//! Ordered collection of detectors

use crate::assumptions::MissingAssumptionsDetector;
use crate::detector::Detector;
use crate::hallucination::HallucinationDetector;
use crate::logical::LogicalInconsistencyDetector;
use crate::overconfidence::OverconfidenceDetector;
use crate::scope::ScopeViolationDetector;
use crate::underspecification::UnderspecificationDetector;
use faris_domain::traits::ReasoningBackend;
use faris_llm::Reasoner;
use std::fmt::Display;
use std::sync::Arc;

/// Detectors in registration order
///
/// The orchestrator fans out over whatever is registered here, so adding a
/// detector needs no change anywhere else. Registration order is also the
/// order detector outputs are collected in.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
}

impl DetectorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The six standard detectors in taxonomy order, sharing one reasoner
    pub fn standard<B>(reasoner: Reasoner<B>) -> Self
    where
        B: ReasoningBackend + Send + Sync + 'static,
        B::Error: Display,
    {
        Self::new()
            .with(HallucinationDetector::new(reasoner.clone()))
            .with(LogicalInconsistencyDetector::new(reasoner.clone()))
            .with(MissingAssumptionsDetector::new(reasoner.clone()))
            .with(OverconfidenceDetector::new(reasoner.clone()))
            .with(ScopeViolationDetector::new(reasoner.clone()))
            .with(UnderspecificationDetector::new(reasoner))
    }

    /// Append a detector
    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, detector: impl Detector + 'static) -> Self {
        self.register(Arc::new(detector));
        self
    }

    /// Registered detectors in order
    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    /// Number of registered detectors
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Whether no detector is registered
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Detector names in order
    pub fn names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field("detectors", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_domain::FailureType;
    use faris_llm::MockProvider;
    use std::time::Duration;

    #[test]
    fn test_standard_registry_follows_taxonomy_order() {
        let reasoner = Reasoner::new(Arc::new(MockProvider::default()), Duration::from_secs(1));
        let registry = DetectorRegistry::standard(reasoner);

        let types: Vec<FailureType> = registry.detectors().iter().map(|d| d.failure_type()).collect();
        assert_eq!(types, FailureType::ALL.to_vec());
        assert_eq!(registry.names()[0], "hallucination");
    }

    #[test]
    fn test_empty_registry() {
        let registry = DetectorRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
