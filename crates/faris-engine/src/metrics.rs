//! Metrics collection for analysis runs

use faris_domain::FailureType;
use std::collections::BTreeMap;

/// Metrics collected across analyses of one orchestrator
///
/// Tracks analysis outcomes, detector failures and timeouts, findings per
/// failure type and cumulative runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineMetrics {
    /// Analyses that returned a result
    pub analyses_completed: usize,

    /// Analyses that returned an error
    pub analyses_failed: usize,

    /// Completed analyses marked degraded
    pub analyses_degraded: usize,

    /// Detector errors per detector name
    pub detector_failures: BTreeMap<String, usize>,

    /// Detector timeouts per detector name
    pub detector_timeouts: BTreeMap<String, usize>,

    /// Aggregated findings per failure type
    pub findings_by_type: BTreeMap<FailureType, usize>,

    /// Findings dropped as structurally invalid
    pub dropped_findings: usize,

    /// Results the case sink failed to store
    pub sink_failures: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl EngineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished analysis
    pub fn record_completed(&mut self, degraded: bool, runtime_ms: u64) {
        self.analyses_completed += 1;
        if degraded {
            self.analyses_degraded += 1;
        }
        self.total_runtime_ms += runtime_ms;
    }

    /// Record an analysis that returned an error
    pub fn record_failed(&mut self, runtime_ms: u64) {
        self.analyses_failed += 1;
        self.total_runtime_ms += runtime_ms;
    }

    /// Record a detector error
    pub fn record_detector_failure(&mut self, detector: &str) {
        *self.detector_failures.entry(detector.to_string()).or_insert(0) += 1;
    }

    /// Record a detector timeout
    pub fn record_detector_timeout(&mut self, detector: &str) {
        *self.detector_timeouts.entry(detector.to_string()).or_insert(0) += 1;
    }

    /// Record one aggregated finding
    pub fn record_finding(&mut self, failure_type: FailureType) {
        *self.findings_by_type.entry(failure_type).or_insert(0) += 1;
    }

    /// Record findings dropped by aggregation
    pub fn record_dropped(&mut self, count: usize) {
        self.dropped_findings += count;
    }

    /// Record a case sink failure
    pub fn record_sink_failure(&mut self) {
        self.sink_failures += 1;
    }

    /// Total analyses attempted
    pub fn total_analyses(&self) -> usize {
        self.analyses_completed + self.analyses_failed
    }

    /// Total findings across all types
    pub fn total_findings(&self) -> usize {
        self.findings_by_type.values().sum()
    }

    /// Mean runtime per analysis in milliseconds
    pub fn mean_runtime_ms(&self) -> u64 {
        match self.total_analyses() {
            0 => 0,
            n => self.total_runtime_ms / n as u64,
        }
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Engine Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Analyses completed: {}", self.analyses_completed),
            format!("Analyses failed: {}", self.analyses_failed),
            format!("Analyses degraded: {}", self.analyses_degraded),
            format!("Mean runtime: {}ms", self.mean_runtime_ms()),
            String::new(),
        ];

        if !self.findings_by_type.is_empty() {
            lines.push("Findings by type:".to_string());
            for (failure_type, count) in &self.findings_by_type {
                lines.push(format!("  {}: {}", failure_type.display_name(), count));
            }
            lines.push(format!("  Total: {}", self.total_findings()));
            lines.push(String::new());
        }

        if !self.detector_failures.is_empty() || !self.detector_timeouts.is_empty() {
            lines.push("Detector problems:".to_string());
            for (name, count) in &self.detector_failures {
                lines.push(format!("  {} failed: {}", name, count));
            }
            for (name, count) in &self.detector_timeouts {
                lines.push(format!("  {} timed out: {}", name, count));
            }
            lines.push(String::new());
        }

        if self.dropped_findings > 0 {
            lines.push(format!("Dropped findings: {}", self.dropped_findings));
        }
        if self.sink_failures > 0 {
            lines.push(format!("Sink failures: {}", self.sink_failures));
        }

        lines.join("\n").trim_end().to_string()
    }
}
