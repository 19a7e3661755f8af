//! Decomposition output types

use faris_domain::Claim;

/// How the claims were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionSource {
    /// Parsed from the reasoning backend's response
    Backend,
    /// Split from the answer text by sentence boundaries
    SentenceSplit,
}

/// Outcome of decomposing one answer
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Ordered claims with ids `c1..cn`
    pub claims: Vec<Claim>,

    /// Assumptions of the answer as a whole
    pub assumptions: Vec<String>,

    /// Reasoning chain reported by the backend
    pub reasoning_chain: Vec<String>,

    /// Where the claims came from
    pub source: DecompositionSource,

    /// Why the backend result was not used, when the backend was attempted
    pub fallback_reason: Option<String>,
}

impl Decomposition {
    /// Whether the backend was attempted and its result discarded
    pub fn is_degraded(&self) -> bool {
        self.fallback_reason.is_some()
    }
}
