//! Read-only view of a request shared by all detectors

use faris_domain::{AnalysisRequest, Claim, ClaimId, Domain};
use std::sync::Arc;

/// Frozen request data and decomposition output
///
/// Cloning is cheap (reference counts only), so every concurrent detector
/// task gets its own handle to the same immutable data.
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    request: Arc<AnalysisRequest>,
    claims: Arc<[Claim]>,
    assumptions: Arc<[String]>,
    reasoning_chain: Arc<[String]>,
}

impl AnalysisSnapshot {
    /// Freeze a request together with its decomposition
    pub fn new(
        request: Arc<AnalysisRequest>,
        claims: Vec<Claim>,
        assumptions: Vec<String>,
        reasoning_chain: Vec<String>,
    ) -> Self {
        Self {
            request,
            claims: claims.into(),
            assumptions: assumptions.into(),
            reasoning_chain: reasoning_chain.into(),
        }
    }

    /// Snapshot with claims only
    pub fn from_claims(request: AnalysisRequest, claims: Vec<Claim>) -> Self {
        Self::new(Arc::new(request), claims, Vec::new(), Vec::new())
    }

    /// The analysed request
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// Question text
    pub fn question(&self) -> &str {
        &self.request.question
    }

    /// Answer text
    pub fn answer(&self) -> &str {
        &self.request.answer
    }

    /// Request domain
    pub fn domain(&self) -> Domain {
        self.request.domain
    }

    /// Reference context, if any
    pub fn context(&self) -> Option<&str> {
        self.request.context_text()
    }

    /// Decomposed claims in answer order
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Look up a claim by id
    pub fn claim(&self, id: ClaimId) -> Option<&Claim> {
        self.claims.iter().find(|c| c.id == id)
    }

    /// Answer-level assumptions from the decomposer
    pub fn assumptions(&self) -> &[String] {
        &self.assumptions
    }

    /// Reasoning chain from the decomposer
    pub fn reasoning_chain(&self) -> &[String] {
        &self.reasoning_chain
    }

    /// Claims rendered one per line as `- [c1] text`
    pub fn claims_block(&self) -> String {
        if self.claims.is_empty() {
            return "No claims extracted.".to_string();
        }
        self.claims
            .iter()
            .map(|c| format!("- [{}] {}", c.id, c.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_data() {
        let snapshot = AnalysisSnapshot::from_claims(
            AnalysisRequest::new("q", "a", Domain::Legal),
            vec![Claim::new(ClaimId::from_ordinal(1), "first")],
        );
        let copy = snapshot.clone();
        assert!(std::ptr::eq(snapshot.claims().as_ptr(), copy.claims().as_ptr()));
        assert_eq!(copy.domain(), Domain::Legal);
    }

    #[test]
    fn test_claims_block() {
        let empty = AnalysisSnapshot::from_claims(AnalysisRequest::new("q", "a", Domain::General), vec![]);
        assert_eq!(empty.claims_block(), "No claims extracted.");

        let snapshot = AnalysisSnapshot::from_claims(
            AnalysisRequest::new("q", "a", Domain::General),
            vec![
                Claim::new(ClaimId::from_ordinal(1), "one"),
                Claim::new(ClaimId::from_ordinal(2), "two"),
            ],
        );
        assert_eq!(snapshot.claims_block(), "- [c1] one\n- [c2] two");
        assert_eq!(snapshot.claim(ClaimId::from_ordinal(2)).unwrap().text, "two");
        assert!(snapshot.claim(ClaimId::from_ordinal(3)).is_none());
    }
}
