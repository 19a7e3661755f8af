//! Remediation recommendations for aggregated findings

use crate::catalog::{entries_for, CATALOG};
use faris_domain::{FailureFinding, FailureType, Priority, Recommendation};
use faris_scoring::SeverityWeights;
use std::collections::BTreeMap;
use tracing::debug;

/// Priority for a finding weight of `severity_weight × confidence`
pub fn priority_for(weight: f64) -> Priority {
    if weight >= 0.6 {
        Priority::High
    } else if weight >= 0.3 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[derive(Debug)]
struct Selected {
    priority: Priority,
    first_type_rank: usize,
    addresses: Vec<FailureType>,
}

/// Maps surviving failure types to catalog remediations
///
/// Output is ordered by priority (highest first), then by the order the
/// failure types appear in the aggregated findings, then by catalog order.
/// An entry addressing several surviving types is emitted once.
#[derive(Debug, Clone)]
pub struct Recommender {
    max_per_type: usize,
    severity_weights: SeverityWeights,
}

impl Recommender {
    /// Create a recommender taking up to `max_per_type` entries per type
    pub fn new(max_per_type: usize, severity_weights: SeverityWeights) -> Self {
        Self {
            max_per_type,
            severity_weights,
        }
    }

    /// Recommendations for aggregated findings
    pub fn recommend(&self, findings: &[FailureFinding]) -> Vec<Recommendation> {
        let mut type_order: Vec<FailureType> = Vec::new();
        let mut type_priority: BTreeMap<FailureType, Priority> = BTreeMap::new();
        for finding in findings {
            if !type_order.contains(&finding.failure_type) {
                type_order.push(finding.failure_type);
            }
            let weight = self.severity_weights.get(finding.severity) * finding.confidence;
            let priority = priority_for(weight);
            type_priority
                .entry(finding.failure_type)
                .and_modify(|p| *p = (*p).max(priority))
                .or_insert(priority);
        }

        let mut selected: BTreeMap<usize, Selected> = BTreeMap::new();
        for (rank, failure_type) in type_order.iter().enumerate() {
            let priority = type_priority.get(failure_type).copied().unwrap_or(Priority::Low);
            for (index, _) in entries_for(*failure_type).take(self.max_per_type) {
                let entry = selected.entry(index).or_insert_with(|| Selected {
                    priority,
                    first_type_rank: rank,
                    addresses: Vec::new(),
                });
                entry.priority = entry.priority.max(priority);
                entry.addresses.push(*failure_type);
            }
        }

        let mut ranked: Vec<(usize, Selected)> = selected.into_iter().collect();
        ranked.sort_by(|(ia, a), (ib, b)| {
            b.priority
                .cmp(&a.priority)
                .then(a.first_type_rank.cmp(&b.first_type_rank))
                .then(ia.cmp(ib))
        });

        debug!(
            "Selected {} recommendations for {} failure types",
            ranked.len(),
            type_order.len()
        );

        ranked
            .into_iter()
            .map(|(index, sel)| {
                let entry = &CATALOG[index];
                Recommendation {
                    kind: entry.kind,
                    priority: sel.priority,
                    title: entry.title.to_string(),
                    description: entry.description.to_string(),
                    addresses: sel.addresses,
                    implementation_hint: Some(entry.implementation_hint.to_string()),
                }
            })
            .collect()
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(2, SeverityWeights::default())
    }
}
