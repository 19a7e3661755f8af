//! Cheap request screening before any backend work

use crate::error::AnalysisError;
use faris_domain::{AnalysisRequest, AnswerKind};

const ERROR_DUMP_MAX_CHARS: usize = 500;
const REFUSAL_MAX_CHARS: usize = 200;

const ERROR_MARKERS: &[&str] = &[
    "error:",
    "exception:",
    "traceback",
    "failed to",
    "internal server error",
];

const REFUSAL_MARKERS: &[&str] = &[
    "i cannot",
    "i can't",
    "i'm unable",
    "i am unable",
    "as an ai",
    "i'm not able",
];

fn short_with_marker(
    text: &str,
    max_chars: usize,
    markers: &'static [&'static str],
) -> Option<&'static str> {
    if text.chars().count() >= max_chars {
        return None;
    }
    let lower = text.to_lowercase();
    markers.iter().copied().find(|m| lower.contains(m))
}

/// Classify a request before decomposition
///
/// An empty question is invalid. An empty answer is left for the decomposer
/// to reject. Short answers that look like an error dump are rejected;
/// short refusals are analysed but flagged.
pub fn precheck(request: &AnalysisRequest) -> Result<AnswerKind, AnalysisError> {
    if request.question.trim().is_empty() {
        return Err(AnalysisError::InvalidRequest("question is empty".to_string()));
    }

    let answer = request.answer.trim();
    if answer.is_empty() {
        return Ok(AnswerKind::Response);
    }

    if let Some(marker) = short_with_marker(answer, ERROR_DUMP_MAX_CHARS, ERROR_MARKERS) {
        return Err(AnalysisError::Rejected(format!(
            "answer looks like an error message (contains \"{}\")",
            marker
        )));
    }

    if short_with_marker(answer, REFUSAL_MAX_CHARS, REFUSAL_MARKERS).is_some() {
        return Ok(AnswerKind::Refusal);
    }

    Ok(AnswerKind::Response)
}
