//! Fixed remediation catalog

use faris_domain::{FailureType, RecommendationType};

/// One remediation the recommender can emit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    /// Category of the remediation
    pub kind: RecommendationType,
    /// Short action title
    pub title: &'static str,
    /// What to do
    pub description: &'static str,
    /// Technical guidance
    pub implementation_hint: &'static str,
    /// Failure types the remediation addresses, in preference order
    pub addresses: &'static [FailureType],
}

use FailureType::*;
use RecommendationType::*;

/// Every remediation, in preference order within each failure type
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        kind: Correction,
        title: "Correct the unsupported claims",
        description: "Remove or fix the claims flagged as false before the answer is used.",
        implementation_hint: "Replace each flagged claim with a sourced statement or drop it.",
        addresses: &[Hallucination],
    },
    CatalogEntry {
        kind: Architecture,
        title: "Add retrieval grounding",
        description: "Ground answers in retrieved, verified documents instead of model recall.",
        implementation_hint: "Index curated sources in a vector store and pass the top matches as context.",
        addresses: &[Hallucination],
    },
    CatalogEntry {
        kind: Prompting,
        title: "Require source citations",
        description: "Ask the model to cite a source for every factual claim.",
        implementation_hint: "State the citation requirement in the system prompt and reject uncited answers.",
        addresses: &[Hallucination],
    },
    CatalogEntry {
        kind: Correction,
        title: "Resolve the contradiction",
        description: "Rewrite the answer so the conflicting claims agree or state the condition under which each holds.",
        implementation_hint: "Keep the better-supported claim and qualify or remove the other.",
        addresses: &[LogicalInconsistency],
    },
    CatalogEntry {
        kind: Prompting,
        title: "Ask for step-by-step reasoning",
        description: "Require the model to show its reasoning so invalid steps become visible.",
        implementation_hint: "Add an explicit reasoning section before the final answer.",
        addresses: &[LogicalInconsistency],
    },
    CatalogEntry {
        kind: Architecture,
        title: "Add a self-consistency check",
        description: "Generate several answers and compare them before responding.",
        implementation_hint: "Sample three to five answers and keep claims they agree on.",
        addresses: &[LogicalInconsistency],
    },
    CatalogEntry {
        kind: Correction,
        title: "State the assumptions",
        description: "Make the answer's prerequisites explicit so readers can check they apply.",
        implementation_hint: "Prefix the answer with the conditions it depends on.",
        addresses: &[MissingAssumptions],
    },
    CatalogEntry {
        kind: Ux,
        title: "Ask clarifying questions",
        description: "Let the assistant ask for missing context instead of guessing.",
        implementation_hint: "Detect missing parameters and return a clarification request before answering.",
        addresses: &[MissingAssumptions, Underspecification],
    },
    CatalogEntry {
        kind: Prompting,
        title: "Provide complete context",
        description: "Include the information the answer depends on in the prompt.",
        implementation_hint: "Use context templates that capture jurisdiction, platform and audience.",
        addresses: &[MissingAssumptions],
    },
    CatalogEntry {
        kind: Correction,
        title: "Qualify absolute statements",
        description: "Replace absolute language with wording that matches the evidence.",
        implementation_hint: "Rewrite 'always', 'never' and 'completely' with calibrated qualifiers.",
        addresses: &[Overconfidence],
    },
    CatalogEntry {
        kind: Prompting,
        title: "Calibrate uncertainty language",
        description: "Ask the model to express uncertainty where the evidence is limited.",
        implementation_hint: "Add hedged examples to the prompt and request a confidence statement.",
        addresses: &[Overconfidence],
    },
    CatalogEntry {
        kind: Config,
        title: "Lower sampling temperature",
        description: "Reduce temperature for factual and safety-relevant queries.",
        implementation_hint: "Use a temperature at or below 0.3 for these request classes.",
        addresses: &[Overconfidence, Hallucination],
    },
    CatalogEntry {
        kind: Correction,
        title: "Remove out-of-scope content",
        description: "Cut the parts of the answer the question did not ask for.",
        implementation_hint: "Keep only content that addresses the question; refer the rest to a professional.",
        addresses: &[ScopeViolation],
    },
    CatalogEntry {
        kind: Prompting,
        title: "Constrain answer scope",
        description: "Define the boundaries of acceptable answers in the system prompt.",
        implementation_hint: "Instruct the model to answer only the question asked and to decline diagnoses.",
        addresses: &[ScopeViolation],
    },
    CatalogEntry {
        kind: Correction,
        title: "Add the missing detail",
        description: "Extend the answer with the steps, parameters or values it leaves out.",
        implementation_hint: "Replace placeholders and list concrete steps.",
        addresses: &[Underspecification],
    },
    CatalogEntry {
        kind: Architecture,
        title: "Detect ambiguous questions",
        description: "Classify questions as underspecified before generating an answer.",
        implementation_hint: "Run a lightweight classifier and route ambiguous questions to clarification.",
        addresses: &[Underspecification],
    },
];

/// Catalog entries addressing `failure_type`, with their catalog index
pub fn entries_for(failure_type: FailureType) -> impl Iterator<Item = (usize, &'static CatalogEntry)> {
    CATALOG
        .iter()
        .enumerate()
        .filter(move |(_, entry)| entry.addresses.contains(&failure_type))
}
