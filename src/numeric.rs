//! Tolerant numeric coercion.
//!
//! Oracle responses and OCR text carry numbers in many shapes: JSON numbers,
//! quoted strings, comma decimals, values with a trailing unit. Every
//! component funnels through these helpers so "what counts as a number" is
//! decided once.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:[.,]\d+)?").unwrap());

/// Coerce a JSON value to a finite f64.
///
/// Numbers pass through; strings go through [`parse_number`]; everything
/// else (bool, null, arrays, objects) is `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Parse a number out of free text.
///
/// Accepts plain floats, comma decimals ("12,5"), and values with
/// surrounding junk ("12.0 g/dL", "~98"). The first numeric token wins.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v).filter(|v| v.is_finite());
    }
    let candidate = NUMBER_RE.find(trimmed)?.as_str().replace(',', ".");
    candidate.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether a value satisfies the "finite positive number" invariant that
/// demographic fields (age, weight) must uphold.
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
