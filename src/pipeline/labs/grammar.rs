//! Line grammar for the structural lab fallback.
//!
//! Recognizes lines shaped like `<name>: <value> <unit> (<low>-<high>)`
//! or `<name>: <value> <unit> range: <low>-<high>`, where the unit and
//! the range are optional and the range separator is a hyphen or an
//! en-dash. The grammar is assembled from named sub-patterns and the two
//! line forms are tried in a fixed order, so each piece can be read and
//! tightened on its own.

use std::sync::LazyLock;

use regex::Regex;

use crate::numeric;

/// Everything before the first colon, kept short so prose sentences
/// containing a colon late in the line do not qualify.
const NAME: &str = r"(?P<name>[^:\n]{1,60}?)";
/// Decimal number, comma or dot decimals accepted.
const VALUE: &str = r"(?P<value>[-+]?\d+(?:[.,]\d+)?)";
/// Unit token such as `g/dL`, `mmol/L`, `%` or `x10^9/L`.
const UNIT: &str = r"(?P<unit>[A-Za-z%µ][A-Za-z0-9µ/%^.*-]*)";
/// Lower bound of a reference range.
const LOW: &str = r"(?P<low>[-+]?\d+(?:[.,]\d+)?)";
/// Upper bound of a reference range.
const HIGH: &str = r"(?P<high>[-+]?\d+(?:[.,]\d+)?)";
/// Words that introduce an unparenthesized reference range.
const RANGE_KEYWORD: &str = r"(?:reference(?:\s+range)?|ref\.?|normal(?:\s+range)?|range)";

/// `<name>: <value> [unit] reference/range/normal[:] <low>-<high>`.
///
/// The keyword is mandatory here; it forces the engine to give a token
/// like `range` back when the greedy unit group swallowed it.
static WORD_RANGE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)^{NAME}\s*:\s*{VALUE}(?:\s*{UNIT})?\s*{RANGE_KEYWORD}\s*:?\s*{LOW}\s*[-–]\s*{HIGH}"
    );
    Regex::new(&pattern).unwrap()
});

/// `<name>: <value> [unit] [(low-high)]` — also covers range-free lines.
static PAREN_RANGE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)^{NAME}\s*:\s*{VALUE}(?:\s*{UNIT})?(?:\s*\(\s*{LOW}\s*[-–]\s*{HIGH}\s*\))?"
    );
    Regex::new(&pattern).unwrap()
});

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").unwrap());

/// One lab reading as it came out of a document, before any reference
/// lookup or classification.
#[derive(Debug, Clone, PartialEq)]
pub struct LabCandidate {
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

/// Scan a document line by line and collect every line the grammar
/// recognizes. Lines without a leading `name:` segment or without a
/// numeric value are skipped.
pub fn scan_lab_lines(text: &str) -> Vec<LabCandidate> {
    text.lines().filter_map(parse_lab_line).collect()
}

fn parse_lab_line(line: &str) -> Option<LabCandidate> {
    let line = LIST_MARKER_RE.replace(line.trim(), "");
    let caps = WORD_RANGE_LINE_RE
        .captures(&line)
        .or_else(|| PAREN_RANGE_LINE_RE.captures(&line))?;

    let name = caps.name("name")?.as_str().trim().to_string();
    if name.is_empty() {
        return None;
    }
    let value = numeric::parse_number(caps.name("value")?.as_str())?;

    Some(LabCandidate {
        name,
        value,
        unit: caps
            .name("unit")
            .map(|m| m.as_str().trim().to_string())
            .filter(|u| !u.is_empty()),
        low: caps.name("low").and_then(|m| numeric::parse_number(m.as_str())),
        high: caps.name("high").and_then(|m| numeric::parse_number(m.as_str())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_line_with_unit_and_range() {
        let labs = scan_lab_lines("Hemoglobin: 12.0 g/dL (13.0-17.0)");
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].name, "Hemoglobin");
        assert_eq!(labs[0].value, 12.0);
        assert_eq!(labs[0].unit.as_deref(), Some("g/dL"));
        assert_eq!(labs[0].low, Some(13.0));
        assert_eq!(labs[0].high, Some(17.0));
    }

    #[test]
    fn en_dash_range_separator() {
        let labs = scan_lab_lines("Potassium: 4.1 mmol/L (3.5–5.0)");
        assert_eq!(labs[0].low, Some(3.5));
        assert_eq!(labs[0].high, Some(5.0));
    }

    #[test]
    fn word_introduced_range() {
        let labs = scan_lab_lines("Sodium: 140 mmol/L range: 136-145");
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].unit.as_deref(), Some("mmol/L"));
        assert_eq!(labs[0].low, Some(136.0));
        assert_eq!(labs[0].high, Some(145.0));
    }

    #[test]
    fn word_range_without_unit_does_not_mistake_keyword_for_unit() {
        let labs = scan_lab_lines("Sodium: 140 range: 136-145");
        assert_eq!(labs[0].unit, None);
        assert_eq!(labs[0].low, Some(136.0));
        assert_eq!(labs[0].high, Some(145.0));
    }

    #[test]
    fn reference_range_keyword_variants() {
        for line in [
            "Glucose: 95 mg/dL reference range: 70-100",
            "Glucose: 95 mg/dL Reference: 70-100",
            "Glucose: 95 mg/dL normal range 70-100",
        ] {
            let labs = scan_lab_lines(line);
            assert_eq!(labs[0].low, Some(70.0), "failed on {line}");
            assert_eq!(labs[0].high, Some(100.0), "failed on {line}");
        }
    }

    #[test]
    fn unit_is_optional() {
        let labs = scan_lab_lines("Sodium: 140 (136-145)");
        assert_eq!(labs[0].unit, None);
        assert_eq!(labs[0].low, Some(136.0));
    }

    #[test]
    fn range_is_optional() {
        let labs = scan_lab_lines("WBC: 7.2 x10^9/L");
        assert_eq!(labs[0].unit.as_deref(), Some("x10^9/L"));
        assert_eq!(labs[0].low, None);
        assert_eq!(labs[0].high, None);
    }

    #[test]
    fn comma_decimals_are_parsed() {
        let labs = scan_lab_lines("Kalium: 4,8 mmol/L (3,5-5,0)");
        assert_eq!(labs[0].value, 4.8);
        assert_eq!(labs[0].low, Some(3.5));
    }

    #[test]
    fn bulleted_lines_are_recognized() {
        let labs = scan_lab_lines("- Glucose: 95 mg/dL (70-100)\n* HbA1c: 5.2 % (4.0-5.6)");
        assert_eq!(labs.len(), 2);
        assert_eq!(labs[0].name, "Glucose");
        assert_eq!(labs[1].name, "HbA1c");
    }

    #[test]
    fn prose_and_blank_lines_are_skipped() {
        let text = "Patient reports feeling well.\n\nHemoglobin: 12.0 g/dL\nNo acute distress";
        let labs = scan_lab_lines(text);
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].name, "Hemoglobin");
    }

    #[test]
    fn value_is_required() {
        assert!(scan_lab_lines("Impression: stable").is_empty());
    }

    #[test]
    fn trailing_annotations_are_tolerated() {
        let labs = scan_lab_lines("Hemoglobin: 12.0 g/dL (13.0-17.0) (L)");
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].high, Some(17.0));
    }

    #[test]
    fn multi_word_names_survive() {
        let labs = scan_lab_lines("Total Cholesterol: 210 mg/dL (125-200)");
        assert_eq!(labs[0].name, "Total Cholesterol");
    }
}
