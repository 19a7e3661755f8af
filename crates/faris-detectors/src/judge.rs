//! Backend judgments shared by all detectors

use crate::error::DetectorError;
use crate::snapshot::AnalysisSnapshot;
use faris_domain::traits::{CompletionConstraints, ReasoningBackend};
use faris_domain::ClaimId;
use faris_llm::json::{array_field, f64_field, str_field};
use faris_llm::Reasoner;
use serde_json::Value;
use std::fmt::Display;
use tracing::debug;

/// Confidence assumed when the backend omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// System prompt for every detector judgment
pub const CRITIC_SYSTEM_PROMPT: &str = "You are a meticulous reviewer of AI-generated answers. \
You look for one specific kind of failure at a time and report only what the text supports. \
Respond with a single JSON object and nothing else.";

/// Ask the backend for a JSON judgment
///
/// Returns `Ok(None)` when the backend is disabled, so detectors fall back to
/// their heuristics without recording a failure.
pub async fn ask<B>(reasoner: &Reasoner<B>, prompt: &str) -> Result<Option<Value>, DetectorError>
where
    B: ReasoningBackend + Send + Sync + 'static,
    B::Error: Display,
{
    if !reasoner.is_enabled() {
        return Ok(None);
    }
    let value = reasoner
        .complete_json(prompt, CompletionConstraints::json_with_system(CRITIC_SYSTEM_PROMPT))
        .await?;
    Ok(Some(value))
}

/// The `findings` array of a judgment
pub fn findings(judgment: &Value) -> &[Value] {
    array_field(judgment, "findings")
}

/// Reported confidence, [`DEFAULT_CONFIDENCE`] when absent
///
/// Out-of-range values pass through untouched; the aggregator rejects them.
pub fn confidence(item: &Value) -> f64 {
    f64_field(item, "confidence").unwrap_or(DEFAULT_CONFIDENCE)
}

/// Claim ids referenced by an item, restricted to claims in the snapshot
///
/// Accepts `claim_id` (string or number), `involved_claims` or `claim_ids`.
pub fn claim_ids(item: &Value, snapshot: &AnalysisSnapshot) -> Vec<ClaimId> {
    let mut raw: Vec<&Value> = Vec::new();
    if let Some(single) = item.get("claim_id") {
        raw.push(single);
    }
    for key in ["involved_claims", "claim_ids"] {
        raw.extend(array_field(item, key));
    }

    let mut ids: Vec<ClaimId> = raw
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).and_then(|n| {
                (n > 0).then(|| ClaimId::from_ordinal(n))
            }),
            _ => None,
        })
        .filter(|id| {
            let known = snapshot.claim(*id).is_some();
            if !known {
                debug!("Ignoring reference to unknown claim {}", id);
            }
            known
        })
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// First present text field among `keys`
pub fn text<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| str_field(item, k))
}
