//! The failure taxonomy
//!
//! Descriptions, typical examples and mitigation strategies for the six
//! failure types. Reference material only: detection never reads it.

use faris_domain::FailureType;
use serde::Serialize;

/// Reference information about one failure type
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyEntry {
    /// The described failure type
    pub failure_type: FailureType,
    /// What the failure is
    pub description: &'static str,
    /// Typical occurrences
    pub examples: &'static [&'static str],
    /// Signals the detectors look for
    pub detection_signals: &'static [&'static str],
    /// How to reduce the failure at its source
    pub mitigation_strategies: &'static [&'static str],
}

static TAXONOMY: [TaxonomyEntry; 6] = [
    TaxonomyEntry {
        failure_type: FailureType::Hallucination,
        description: "Information that is false, fabricated or not grounded in the supplied context, \
                      including invented citations, entities and figures.",
        examples: &[
            "Citing a study that does not exist",
            "Stating a drug has no side effects",
            "Inventing statistics",
        ],
        detection_signals: &[
            "Claims contradicted by known facts",
            "Citations or figures absent from the context",
            "Appeals to unnamed research",
        ],
        mitigation_strategies: &[
            "Ground answers with retrieval over verified sources",
            "Require citations for factual claims",
            "Verify claims in a separate checking pass",
            "Lower temperature for factual queries",
        ],
    },
    TaxonomyEntry {
        failure_type: FailureType::LogicalInconsistency,
        description: "Claims that contradict each other or conclusions that do not follow from \
                      their premises.",
        examples: &[
            "Stating X and later not X",
            "Justifying a claim with itself",
            "Drawing a conclusion the argument does not support",
        ],
        detection_signals: &[
            "Pairs of claims with opposite polarity on the same subject",
            "Circular justification",
            "Invalid inference patterns",
        ],
        mitigation_strategies: &[
            "Ask for explicit step-by-step reasoning",
            "Sample several answers and check agreement",
            "Review reasoning with a critic model",
        ],
    },
    TaxonomyEntry {
        failure_type: FailureType::MissingAssumptions,
        description: "The answer depends on prerequisites or context that the question never \
                      provided and the answer never states.",
        examples: &[
            "Assuming US tax law for a tax question",
            "Assuming a programming language",
            "Ignoring edge cases without saying so",
        ],
        detection_signals: &[
            "Presuming language such as \"obviously\" or \"as you know\"",
            "Assumptions absent from the question and context",
        ],
        mitigation_strategies: &[
            "Have the model list its assumptions first",
            "Ask for clarification when context is missing",
            "Supply complete context in the prompt",
        ],
    },
    TaxonomyEntry {
        failure_type: FailureType::Overconfidence,
        description: "Certainty out of proportion to the evidence, typically absolute language on \
                      uncertain or contested matters.",
        examples: &[
            "\"Always\" or \"never\" for probabilistic outcomes",
            "Opinions stated as fact",
            "Guarantees about future events",
        ],
        detection_signals: &[
            "Absolute terms without hedging",
            "Certainty attached to unsupported claims",
        ],
        mitigation_strategies: &[
            "Ask for explicit confidence qualifiers",
            "Calibrate with hedged examples",
            "Flag absolute statements in post-processing",
        ],
    },
    TaxonomyEntry {
        failure_type: FailureType::ScopeViolation,
        description: "Content beyond what was asked or beyond what the assistant should provide, \
                      such as a diagnosis in answer to a general question.",
        examples: &[
            "Diagnosing when asked for general information",
            "Unsolicited advice",
            "Drifting to an unrelated topic",
        ],
        detection_signals: &[
            "Capability boundary language (diagnosis, legal advice)",
            "Tangent markers",
            "Little overlap between question and answer vocabulary",
        ],
        mitigation_strategies: &[
            "State the answer scope in the system prompt",
            "Filter tangential content",
            "Route high-stakes requests to a professional",
        ],
    },
    TaxonomyEntry {
        failure_type: FailureType::Underspecification,
        description: "The answer lacks the detail the question needs to be acted on, or proceeds \
                      on an ambiguous question without asking for clarification.",
        examples: &[
            "A one-line answer to a how-to question",
            "Placeholders instead of values",
            "Answering \"which is best?\" without asking \"for what?\"",
        ],
        detection_signals: &[
            "Procedural question without steps, code or figures",
            "Placeholder text",
            "Missing parameters",
        ],
        mitigation_strategies: &[
            "Detect ambiguous questions before answering",
            "Add a clarification turn",
            "Communicate default assumptions",
        ],
    },
];

/// All taxonomy entries in failure type order
pub fn taxonomy() -> &'static [TaxonomyEntry] {
    &TAXONOMY
}

/// The entry for one failure type
pub fn taxonomy_entry(failure_type: FailureType) -> &'static TaxonomyEntry {
    let index = FailureType::ALL
        .iter()
        .position(|t| *t == failure_type)
        .unwrap_or(0);
    &TAXONOMY[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_covers_all_types_in_order() {
        let types: Vec<FailureType> = taxonomy().iter().map(|e| e.failure_type).collect();
        assert_eq!(types, FailureType::ALL.to_vec());
    }

    #[test]
    fn test_entries_are_complete() {
        for entry in taxonomy() {
            assert!(!entry.description.is_empty());
            assert!(!entry.examples.is_empty());
            assert!(entry.mitigation_strategies.len() >= 3);
            assert_eq!(taxonomy_entry(entry.failure_type).failure_type, entry.failure_type);
        }
    }
}
