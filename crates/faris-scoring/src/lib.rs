//! FARIS Scoring
//!
//! Turns raw detector findings into an ordered, deduplicated finding set and
//! a deterministic risk assessment. No I/O and no async: everything here is
//! a pure function of its inputs and a [`ScoringConfig`].
//!
//! The scoring layer provides:
//! - Structural validation of findings ([`InvariantViolation`])
//! - Confidence filtering and merging of overlapping same-type findings
//! - The weighted risk formula, level banding and confidence interval
//! - Ranked risk factors and a human-readable summary
//!
//! # Examples
//!
//! ```
//! use faris_domain::{ClaimId, Domain, FailureFinding, FailureType, RiskLevel, Severity};
//! use faris_scoring::{Aggregator, RiskScorer, ScoringConfig};
//!
//! let config = ScoringConfig::default();
//! let claims = [ClaimId::from_ordinal(1)];
//! let findings = vec![FailureFinding::new(
//!     FailureType::Hallucination,
//!     Severity::Critical,
//!     0.95,
//!     "Claim c1 is likely false",
//! )
//! .with_claims(claims)];
//!
//! let aggregated = Aggregator::from_config(&config).aggregate(findings, &claims);
//! let assessment = RiskScorer::new(config).score(&aggregated.findings, Domain::Medical);
//! assert_eq!(assessment.level, RiskLevel::Medium);
//! ```

#![warn(missing_docs)]

mod aggregator;
mod config;
mod error;
mod scorer;

pub use aggregator::{check_finding, finding_order, AggregatedFindings, Aggregator};
pub use config::{DomainMultipliers, FailureTypeWeights, RiskThresholds, ScoringConfig, SeverityWeights};
pub use error::InvariantViolation;
pub use scorer::{std_dev, RiskScorer};
