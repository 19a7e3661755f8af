//! Parse backend output into claim candidates

use crate::error::DecomposerError;
use faris_domain::ClaimType;
use faris_llm::json::{array_field, parse_json, str_field, string_list};
use serde_json::Value;
use tracing::warn;

/// A claim as proposed by the backend, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimCandidate {
    /// Claim text
    pub text: String,
    /// Claim type
    pub claim_type: ClaimType,
    /// Unstated premises
    pub implicit_assumptions: Vec<String>,
}

impl ClaimCandidate {
    /// A factual candidate without assumptions
    pub fn factual(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            claim_type: ClaimType::Factual,
            implicit_assumptions: Vec::new(),
        }
    }
}

/// Parsed decomposition response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDecomposition {
    /// Candidates in response order
    pub claims: Vec<ClaimCandidate>,
    /// Assumptions of the answer as a whole
    pub overall_assumptions: Vec<String>,
    /// Reasoning steps
    pub reasoning_chain: Vec<String>,
}

/// Parse a backend response
///
/// Accepts the documented object, or a bare array of claims. Malformed
/// items are skipped with a warning.
pub fn parse_decomposition(response: &str) -> Result<ParsedDecomposition, DecomposerError> {
    let json = parse_json(response).map_err(DecomposerError::InvalidFormat)?;

    let (items, overall_assumptions, reasoning_chain) = match &json {
        Value::Array(items) => (items.as_slice(), Vec::new(), Vec::new()),
        Value::Object(_) if json.get("claims").is_some_and(Value::is_array) => (
            array_field(&json, "claims"),
            string_list(&json, "overall_assumptions"),
            string_list(&json, "reasoning_chain"),
        ),
        _ => {
            return Err(DecomposerError::InvalidFormat(
                "Expected an object with a 'claims' array".to_string(),
            ))
        }
    };

    let mut claims = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match parse_claim(item) {
            Ok(candidate) => claims.push(candidate),
            Err(e) => warn!("Skipping claim {}: {}", idx, e),
        }
    }

    Ok(ParsedDecomposition {
        claims,
        overall_assumptions,
        reasoning_chain,
    })
}

fn parse_claim(item: &Value) -> Result<ClaimCandidate, String> {
    if let Some(text) = item.as_str() {
        return Ok(ClaimCandidate::factual(text.trim()));
    }
    if !item.is_object() {
        return Err("Claim is neither a string nor an object".to_string());
    }

    let text = str_field(item, "claim_text")
        .or_else(|| str_field(item, "text"))
        .ok_or_else(|| "Missing or invalid 'claim_text'".to_string())?;

    Ok(ClaimCandidate {
        text: text.to_string(),
        claim_type: str_field(item, "claim_type")
            .map(ClaimType::parse_lenient)
            .unwrap_or_default(),
        implicit_assumptions: string_list(item, "implicit_assumptions"),
    })
}
