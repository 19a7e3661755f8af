//! Finding aggregation
//!
//! Validates, filters, merges and orders the findings of all detectors.
//! The output depends only on the multiset of input findings, never on the
//! order detectors finished in.

use crate::config::ScoringConfig;
use crate::error::InvariantViolation;
use faris_domain::{ClaimId, FailureFinding, FailureType};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Aggregated findings of one analysis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregatedFindings {
    /// Merged findings, most severe first
    pub findings: Vec<FailureFinding>,

    /// Whether any finding survived
    pub failure_detected: bool,

    /// Distinct failure types in order of first appearance in `findings`
    pub failure_types: Vec<FailureType>,

    /// Findings dropped as structurally invalid
    pub violations: Vec<InvariantViolation>,

    /// Valid findings discarded for low confidence
    pub below_threshold: usize,
}

/// Total order on findings: severity desc, confidence desc, then type,
/// claims, description and evidence so equal keys never depend on input order
pub fn finding_order(a: &FailureFinding, b: &FailureFinding) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.failure_type.cmp(&b.failure_type))
        .then_with(|| a.claim_ids.cmp(&b.claim_ids))
        .then_with(|| a.description.cmp(&b.description))
        .then_with(|| a.evidence.cmp(&b.evidence))
}

/// Check one finding's structural invariants
pub fn check_finding(finding: &FailureFinding, known_claims: &[ClaimId]) -> Result<(), InvariantViolation> {
    if !finding.confidence.is_finite() || !(0.0..=1.0).contains(&finding.confidence) {
        return Err(InvariantViolation::ConfidenceOutOfRange {
            failure_type: finding.failure_type,
            confidence: finding.confidence,
        });
    }
    if finding.description.trim().is_empty() {
        return Err(InvariantViolation::EmptyDescription(finding.failure_type));
    }
    if let Some(unknown) = finding.claim_ids.iter().find(|id| !known_claims.contains(*id)) {
        return Err(InvariantViolation::UnknownClaim {
            failure_type: finding.failure_type,
            claim_id: *unknown,
        });
    }
    Ok(())
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge a group of same-type findings into one
fn merge(mut group: Vec<FailureFinding>) -> Option<FailureFinding> {
    group.sort_by(finding_order);
    let mut iter = group.into_iter();
    let mut merged = iter.next()?;
    for other in iter {
        merged.severity = merged.severity.max(other.severity);
        merged.confidence = merged.confidence.max(other.confidence);
        merged.claim_ids.extend(other.claim_ids);
        for evidence in other.evidence {
            if !merged.evidence.contains(&evidence) {
                merged.evidence.push(evidence);
            }
        }
    }
    merged.claim_ids.sort();
    merged.claim_ids.dedup();
    Some(merged)
}

/// Merges same-type findings that implicate overlapping claims
#[derive(Debug, Clone)]
pub struct Aggregator {
    min_confidence: f64,
}

impl Aggregator {
    /// Create an aggregator discarding findings below `min_confidence`
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Create an aggregator from the scoring configuration
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.min_finding_confidence)
    }

    /// Aggregate raw detector findings
    ///
    /// `known_claims` are the ids the decomposition produced; a finding
    /// referencing any other id is an invariant violation.
    pub fn aggregate(&self, findings: Vec<FailureFinding>, known_claims: &[ClaimId]) -> AggregatedFindings {
        let mut result = AggregatedFindings::default();

        let mut by_type: BTreeMap<FailureType, Vec<FailureFinding>> = BTreeMap::new();
        for finding in findings {
            if let Err(violation) = check_finding(&finding, known_claims) {
                warn!("Dropping invalid finding: {}", violation);
                result.violations.push(violation);
                continue;
            }
            if finding.confidence < self.min_confidence {
                debug!(
                    "Discarding {} finding at confidence {:.2}",
                    finding.failure_type, finding.confidence
                );
                result.below_threshold += 1;
                continue;
            }
            by_type.entry(finding.failure_type).or_default().push(finding);
        }

        let mut merged = Vec::new();
        for group in by_type.into_values() {
            merged.extend(Self::merge_overlapping(group));
        }
        merged.sort_by(finding_order);

        for finding in &merged {
            if !result.failure_types.contains(&finding.failure_type) {
                result.failure_types.push(finding.failure_type);
            }
        }
        result.failure_detected = !merged.is_empty();
        result.findings = merged;
        result
    }

    /// Union findings into connected components by claim overlap
    fn merge_overlapping(group: Vec<FailureFinding>) -> Vec<FailureFinding> {
        let mut parent: Vec<usize> = (0..group.len()).collect();
        for i in 0..group.len() {
            for j in i + 1..group.len() {
                if group[i].overlaps(&group[j]) {
                    let (a, b) = (find_root(&mut parent, i), find_root(&mut parent, j));
                    if a != b {
                        parent[b] = a;
                    }
                }
            }
        }

        let mut components: Vec<(usize, Vec<FailureFinding>)> = Vec::new();
        for (i, finding) in group.into_iter().enumerate() {
            let root = find_root(&mut parent, i);
            match components.iter_mut().find(|(r, _)| *r == root) {
                Some((_, members)) => members.push(finding),
                None => components.push((root, vec![finding])),
            }
        }
        components.into_iter().filter_map(|(_, members)| merge(members)).collect()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faris_domain::Severity;

    fn c(n: u32) -> ClaimId {
        ClaimId::from_ordinal(n)
    }

    fn finding(t: FailureType, sev: Severity, conf: f64, claims: &[u32]) -> FailureFinding {
        FailureFinding::new(t, sev, conf, format!("{} on {:?}", t, claims))
            .with_claims(claims.iter().map(|n| c(*n)))
    }

    fn known() -> Vec<ClaimId> {
        (1..=5).map(c).collect()
    }

    #[test]
    fn test_empty_input() {
        let result = Aggregator::default().aggregate(vec![], &known());
        assert!(!result.failure_detected);
        assert!(result.findings.is_empty());
        assert!(result.failure_types.is_empty());
    }

    #[test]
    fn test_merges_same_type_overlapping_claims() {
        let findings = vec![
            finding(FailureType::Overconfidence, Severity::Medium, 0.65, &[2]).with_evidence("heuristic"),
            finding(FailureType::Overconfidence, Severity::Medium, 0.9, &[2, 3]).with_evidence("backend"),
        ];
        let result = Aggregator::default().aggregate(findings, &known());

        assert_eq!(result.findings.len(), 1);
        let merged = &result.findings[0];
        assert_eq!(merged.confidence, 0.9);
        assert_eq!(merged.claim_ids, vec![c(2), c(3)]);
        assert_eq!(merged.evidence, vec!["backend", "heuristic"]);
    }

    #[test]
    fn test_merge_is_transitive() {
        let findings = vec![
            finding(FailureType::LogicalInconsistency, Severity::Medium, 0.6, &[1, 2]),
            finding(FailureType::LogicalInconsistency, Severity::High, 0.7, &[3, 4]),
            finding(FailureType::LogicalInconsistency, Severity::Medium, 0.8, &[2, 3]),
        ];
        let result = Aggregator::default().aggregate(findings, &known());

        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].severity, Severity::High);
        assert_eq!(result.findings[0].confidence, 0.8);
        assert_eq!(result.findings[0].claim_ids, vec![c(1), c(2), c(3), c(4)]);
    }

    #[test]
    fn test_different_types_never_merge() {
        let findings = vec![
            finding(FailureType::Hallucination, Severity::High, 0.8, &[1]),
            finding(FailureType::Overconfidence, Severity::Medium, 0.8, &[1]),
        ];
        let result = Aggregator::default().aggregate(findings, &known());

        assert_eq!(result.findings.len(), 2);
        assert_eq!(
            result.failure_types,
            vec![FailureType::Hallucination, FailureType::Overconfidence]
        );
    }

    #[test]
    fn test_claimless_findings_stay_separate() {
        let findings = vec![
            finding(FailureType::ScopeViolation, Severity::Low, 0.5, &[]),
            finding(FailureType::ScopeViolation, Severity::Medium, 0.6, &[]),
        ];
        let result = Aggregator::default().aggregate(findings, &known());
        assert_eq!(result.findings.len(), 2);
    }

    #[test]
    fn test_sorted_by_severity_then_confidence() {
        let findings = vec![
            finding(FailureType::Underspecification, Severity::Low, 0.9, &[]),
            finding(FailureType::Overconfidence, Severity::Medium, 0.6, &[1]),
            finding(FailureType::Hallucination, Severity::Critical, 0.7, &[2]),
            finding(FailureType::MissingAssumptions, Severity::Medium, 0.8, &[3]),
        ];
        let result = Aggregator::default().aggregate(findings, &known());

        let order: Vec<FailureType> = result.findings.iter().map(|f| f.failure_type).collect();
        assert_eq!(
            order,
            vec![
                FailureType::Hallucination,
                FailureType::MissingAssumptions,
                FailureType::Overconfidence,
                FailureType::Underspecification,
            ]
        );
    }

    #[test]
    fn test_invalid_findings_dropped_and_reported() {
        let findings = vec![
            finding(FailureType::Hallucination, Severity::High, 1.5, &[1]),
            finding(FailureType::Hallucination, Severity::High, f64::NAN, &[1]),
            FailureFinding::new(FailureType::ScopeViolation, Severity::Low, 0.6, "  "),
            finding(FailureType::Overconfidence, Severity::Medium, 0.7, &[9]),
            finding(FailureType::Overconfidence, Severity::Medium, 0.7, &[1]),
        ];
        let result = Aggregator::default().aggregate(findings, &known());

        assert_eq!(result.violations.len(), 4);
        assert_eq!(result.findings.len(), 1);
        assert!(matches!(
            result.violations[3],
            InvariantViolation::UnknownClaim { claim_id, .. } if claim_id == c(9)
        ));
    }

    #[test]
    fn test_low_confidence_discarded() {
        let findings = vec![
            finding(FailureType::Overconfidence, Severity::Medium, 0.3, &[1]),
            finding(FailureType::Overconfidence, Severity::Medium, 0.5, &[2]),
        ];
        let result = Aggregator::new(0.5).aggregate(findings, &known());

        assert_eq!(result.below_threshold, 1);
        assert_eq!(result.findings.len(), 1);
        assert!(result.violations.is_empty());
    }
}
