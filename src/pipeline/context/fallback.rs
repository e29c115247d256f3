//! Regex backstop for demographics the oracle left null.
//!
//! Fills only still-missing fields; an oracle-provided value is never
//! overridden. Patterns are tried in order and the first match wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::CaseContext;
use crate::numeric::{self, is_positive_finite};

static AGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(\d{1,3})\s*(?:years?\s*(?:old)?|yrs?\.?|y/o)\b").unwrap(),
        Regex::new(r"(?i)\bage\s*[:=]?\s*(\d{1,3})\b").unwrap(),
    ]
});

static WEIGHT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bweight\s*[:=]?\s*(\d{1,3}(?:[.,]\d+)?)\s*kg\b").unwrap(),
        Regex::new(r"(?i)\b(\d{1,3}(?:[.,]\d+)?)\s*kg\b").unwrap(),
    ]
});

/// Scan the transcript for age and weight statements and fill whichever
/// of the two fields are still `None`.
pub fn fill_missing_demographics(context: &mut CaseContext, transcript: &str) {
    if context.age_years.is_none() {
        context.age_years = first_capture(&AGE_PATTERNS, transcript);
    }
    if context.weight_kg.is_none() {
        context.weight_kg = first_capture(&WEIGHT_PATTERNS, transcript);
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns.iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        let value = numeric::parse_number(caps.get(1)?.as_str())?;
        is_positive_finite(value).then_some(value)
    })
}
