//! Deterministic risk scoring
//!
//! ```text
//! raw   = Σ confidence × severity_weight × domain_multiplier × type_weight
//! score = clamp(raw, 0, 1)
//! CI    = score ± interval_width × stddev(confidences), clamped to [0, 1]
//! ```

use crate::config::ScoringConfig;
use faris_domain::{
    ConfidenceInterval, Domain, FailureFinding, RiskAssessment, RiskContribution, RiskLevel,
};
use std::fmt::Write;
use tracing::debug;

/// Population standard deviation, 0.0 for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn advisory(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "Low risk: safe to use with standard review.",
        RiskLevel::Medium => "Medium risk: review the flagged concerns before use.",
        RiskLevel::High => "High risk: do not use without correction.",
    }
}

/// Converts aggregated findings into a risk assessment
///
/// Pure and synchronous: identical findings and domain always produce a
/// bit-identical assessment.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    config: ScoringConfig,
}

impl RiskScorer {
    /// Create a scorer with the given configuration
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// The scoring configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Band a score using the configured thresholds
    pub fn level_for(&self, score: f64) -> RiskLevel {
        self.config.thresholds.level(score)
    }

    /// Per-finding contributions in finding order
    pub fn contributions(&self, findings: &[FailureFinding], domain: Domain) -> Vec<RiskContribution> {
        let multiplier = self.config.domain_multipliers.get(domain);
        findings
            .iter()
            .map(|f| {
                let severity_weight = self.config.severity_weights.get(f.severity);
                let type_weight = self.config.failure_type_weights.get(f.failure_type);
                RiskContribution {
                    failure_type: f.failure_type,
                    severity: f.severity,
                    confidence: f.confidence,
                    severity_weight,
                    type_weight,
                    contribution: f.confidence * severity_weight * multiplier * type_weight,
                }
            })
            .collect()
    }

    /// Up to `max_risk_factors` descriptions of the most heavily weighted
    /// findings, ranked by `confidence × severity_weight × domain_multiplier`
    pub fn risk_factors(&self, findings: &[FailureFinding], domain: Domain) -> Vec<String> {
        let multiplier = self.config.domain_multipliers.get(domain);
        let mut ranked: Vec<(f64, &FailureFinding)> = findings
            .iter()
            .map(|f| (f.confidence * self.config.severity_weights.get(f.severity) * multiplier, f))
            .collect();
        // Stable sort keeps aggregator order for ties
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        ranked
            .into_iter()
            .take(self.config.max_risk_factors)
            .map(|(_, f)| {
                format!(
                    "{} ({}, {:.0}% confidence): {}",
                    f.failure_type.display_name(),
                    f.severity,
                    f.confidence * 100.0,
                    f.description
                )
            })
            .collect()
    }

    /// Score aggregated findings for a request in `domain`
    pub fn score(&self, findings: &[FailureFinding], domain: Domain) -> RiskAssessment {
        let multiplier = self.config.domain_multipliers.get(domain);
        let contributions = self.contributions(findings, domain);
        let raw: f64 = contributions.iter().map(|c| c.contribution).sum();
        let score = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
        let level = self.level_for(score);

        let confidences: Vec<f64> = findings.iter().map(|f| f.confidence).collect();
        let confidence_interval = if confidences.is_empty() {
            ConfidenceInterval::point(score)
        } else {
            ConfidenceInterval::around(score, self.config.interval_width * std_dev(&confidences))
        };

        debug!(
            "Scored {} findings in {} domain: raw {:.4}, score {:.4} ({})",
            findings.len(),
            domain,
            raw,
            score,
            level
        );

        let risk_factors = self.risk_factors(findings, domain);
        let summary = Self::summary(score, level, multiplier, domain, &contributions);

        RiskAssessment {
            score,
            level,
            confidence_interval,
            risk_factors,
            contributions,
            domain_multiplier: multiplier,
            summary,
        }
    }

    fn summary(
        score: f64,
        level: RiskLevel,
        multiplier: f64,
        domain: Domain,
        contributions: &[RiskContribution],
    ) -> String {
        let mut out = format!(
            "Risk Score: {:.2} ({})\nDomain multiplier: {:.1}x ({})\nFindings: {}\n",
            score,
            level.as_str().to_uppercase(),
            multiplier,
            domain,
            contributions.len()
        );

        if !contributions.is_empty() {
            out.push_str("Top contributors:\n");
            let mut top: Vec<&RiskContribution> = contributions.iter().collect();
            top.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
            for c in top.into_iter().take(3) {
                let _ = writeln!(
                    out,
                    "  - {} ({}): {:.3}",
                    c.failure_type.display_name(),
                    c.severity,
                    c.contribution
                );
            }
        }
        out.push_str(advisory(level));
        out
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
