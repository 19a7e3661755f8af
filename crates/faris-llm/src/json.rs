//! JSON extraction from model output
//!
//! Models asked for JSON still wrap it in markdown fences or surround it with
//! prose. These helpers recover the JSON payload and read loosely-typed
//! fields without failing the whole response over one bad value.

use serde_json::Value;

/// Extract the JSON payload from a model response
///
/// Handles raw JSON, fenced blocks (with or without a language tag) and
/// prose around a single top-level object or array.
pub fn extract_json(response: &str) -> Option<&str> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return None;
    }

    let unfenced = strip_fences(trimmed);
    if unfenced.starts_with('{') || unfenced.starts_with('[') {
        return Some(unfenced);
    }

    // Prose around the payload: take the widest balanced-looking span
    let start = unfenced.find(['{', '['])?;
    let closing = if unfenced[start..].starts_with('{') { '}' } else { ']' };
    let end = unfenced.rfind(closing)?;
    (end > start).then(|| &unfenced[start..=end])
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the language tag line (```json)
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a model response into a JSON value
pub fn parse_json(response: &str) -> Result<Value, String> {
    let payload = extract_json(response).ok_or_else(|| "No JSON found in response".to_string())?;
    serde_json::from_str(payload).map_err(|e| format!("JSON parse error: {}", e))
}

/// Read a string field, trimmed, treating blanks as absent
pub fn str_field<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Read a number field, accepting numeric strings
pub fn f64_field(obj: &Value, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a boolean field, accepting "true"/"false" strings
pub fn bool_field(obj: &Value, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().to_lowercase().parse().ok(),
        _ => None,
    }
}

/// Read an array of strings, skipping non-string entries
pub fn string_list(obj: &Value, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// The array stored under `key`, or an empty slice
pub fn array_field<'a>(obj: &'a Value, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json), Some(json));
    }

    #[test]
    fn test_extract_json_from_markdown() {
        let response = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response), Some(r#"{"key": "value"}"#));
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n[1, 2]\n```";
        assert_eq!(extract_json(response), Some("[1, 2]"));
    }

    #[test]
    fn test_extract_json_surrounded_by_prose() {
        let response = "Sure! Here is the analysis: {\"findings\": []} Hope this helps.";
        assert_eq!(extract_json(response), Some("{\"findings\": []}"));
    }

    #[test]
    fn test_extract_json_none_for_prose() {
        assert_eq!(extract_json("This is not JSON"), None);
        assert_eq!(extract_json("   "), None);
    }

    #[test]
    fn test_parse_json_errors() {
        assert!(parse_json("no json here").is_err());
        assert!(parse_json("{broken").is_err());
        assert!(parse_json("{\"ok\": true}").is_ok());
    }

    #[test]
    fn test_lenient_field_readers() {
        let value = json!({
            "name": "  alice ",
            "blank": "   ",
            "score": "0.75",
            "flag": "TRUE",
            "tags": ["a", 1, " ", "b"],
            "single": "only"
        });
        assert_eq!(str_field(&value, "name"), Some("alice"));
        assert_eq!(str_field(&value, "blank"), None);
        assert_eq!(f64_field(&value, "score"), Some(0.75));
        assert_eq!(bool_field(&value, "flag"), Some(true));
        assert_eq!(string_list(&value, "tags"), vec!["a", "b"]);
        assert_eq!(string_list(&value, "single"), vec!["only"]);
        assert!(array_field(&value, "missing").is_empty());
    }
}
