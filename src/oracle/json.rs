//! Tolerant extraction of structured JSON from oracle text.
//!
//! The oracle is asked for strict JSON but does not always comply: fenced
//! code blocks, leading prose, trailing commentary. Instead of hardening
//! each extractor separately, every oracle response goes through one fixed
//! chain:
//!
//! 1. strip code-fence markers and try a direct parse;
//! 2. locate the first `{...}` span and parse that;
//! 3. give up and treat the response as an empty object.
//!
//! Failure is therefore never an error, just an absence of fields — the
//! extractors' fallback rules take it from there.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)```json|```").unwrap());
static BRACE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Remove code-fence markers (```json ... ```) from oracle output.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Extract a JSON object from oracle text, or an empty map if none can be
/// recovered.
pub fn extract_object(text: &str) -> Map<String, Value> {
    if text.trim().is_empty() {
        return Map::new();
    }
    let cleaned = strip_code_fences(text);

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&cleaned) {
        return map;
    }

    // Greedy first-to-last brace span; catches objects buried in prose.
    if let Some(m) = BRACE_SPAN_RE.find(&cleaned) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(m.as_str()) {
            return map;
        }
    }

    Map::new()
}

/// A non-empty trimmed string field. Numbers are stringified so a response
/// like `"strength": 500` still resolves.
pub fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A numeric field, via tolerant coercion (numbers or numeric strings).
pub fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(crate::numeric::coerce_f64)
}

/// A boolean field. Anything other than a JSON bool is `None`.
pub fn bool_field(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

/// An array field, empty slice when absent or mistyped.
pub fn array_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

/// An array-of-strings field: non-string items dropped, strings trimmed,
/// empties dropped.
pub fn string_list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    array_field(map, key)
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
