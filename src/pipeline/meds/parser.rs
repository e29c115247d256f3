//! Medication line grammar.
//!
//! Each line is `name [strength unit] [form] [route] [frequency] [prn]`
//! in that fixed order, case-insensitive, separated by whitespace, commas
//! or semicolons. The name is greedy but bounded by the first recognized
//! token; whatever follows the last recognized token is ignored. Parsing
//! is best-effort: a line that does not yield a name is dropped, never
//! reported as an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::MedicationMention;

/// Dose units that can follow a strength number.
const DOSE_UNITS: &str = r"mg|mcg|g|iu|units|ml";
/// Dispensed-form vocabulary.
const FORMS: &str =
    r"tablet|tab|capsule|cap|syrup|solution|suspension|patch|injection|cream|ointment|drops|spray";
/// Administration routes, longest spelling first within each family.
const ROUTES: &str = r"by mouth|po|oral|iv|im|subcutaneous|subcut|sc|topical|inhalation|ophthalmic|otic|nasal|rectal|vaginal";
/// Dosing frequencies, multi-word forms first.
const FREQUENCIES: &str = r"once daily|twice daily|three times daily|every\s+\d+\s*(?:hours|hrs|hr|h)|q\s*\d+\s*h|bid|tid|qid|qhs|qam|qpm|prn";
/// Strength number, comma or dot decimals.
const NUMBER: &str = r"\d+(?:[.,]\d+)?";
/// Token separator inside the chain.
const SEP: &str = r"[\s,;]*";

/// Leftmost position where any recognized token begins. This is what
/// bounds the greedy name.
static TOKEN_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)\b(?:{NUMBER}\s*(?:{DOSE_UNITS})\b|(?:{FORMS})\b|(?:{ROUTES})\b|(?:{FREQUENCIES})\b)"
    );
    Regex::new(&pattern).unwrap()
});

/// The fixed-order token chain, anchored at the first recognized token.
static CHAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)^(?:(?P<strength>{NUMBER})\s*(?P<unit>{DOSE_UNITS})\b)?(?:{SEP}(?P<form>{FORMS})\b)?(?:{SEP}(?P<route>{ROUTES})\b)?(?:{SEP}(?P<frequency>{FREQUENCIES})\b)?(?:{SEP}(?P<prn>prn)\b)?"
    );
    Regex::new(&pattern).unwrap()
});

/// Letters, digits, hyphens, apostrophes and spaces, with at least one
/// letter somewhere.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\d'’ \-]*\p{L}[\p{L}\d'’ \-]*$").unwrap());

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").unwrap());

/// Parse free text into medication mentions, one per recognizable line.
pub fn parse_medication_lines(text: &str) -> Vec<MedicationMention> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<MedicationMention> {
    let raw = line.trim();
    if raw.is_empty() {
        return None;
    }
    let body = LIST_MARKER_RE.replace(raw, "");
    let body = body.trim();

    let (name, rest) = match TOKEN_START_RE.find(body) {
        Some(token) => (&body[..token.start()], &body[token.start()..]),
        None => (body, ""),
    };
    let name = name
        .trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .trim();
    if name.is_empty() || !NAME_RE.is_match(name) {
        return None;
    }

    let caps = CHAIN_RE.captures(rest)?;
    let token = |group: &str| {
        caps.name(group)
            .map(|m| collapse_whitespace(&m.as_str().to_lowercase()))
    };
    let strength = caps.name("strength").map(|m| m.as_str().to_string());
    let frequency = token("frequency");
    let prn = caps.name("prn").is_some() || frequency.as_deref() == Some("prn");

    Some(MedicationMention {
        name: name.to_string(),
        strength,
        unit: token("unit"),
        form: token("form"),
        route: token("route"),
        frequency,
        prn,
        raw: raw.to_string(),
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> MedicationMention {
        let mut mentions = parse_medication_lines(line);
        assert_eq!(mentions.len(), 1, "expected one mention from {line:?}");
        mentions.remove(0)
    }

    #[test]
    fn full_line_parses_every_field() {
        let m = parse_one("Amoxicillin 500mg tablet PO tid");
        assert_eq!(m.name, "Amoxicillin");
        assert_eq!(m.strength.as_deref(), Some("500"));
        assert_eq!(m.unit.as_deref(), Some("mg"));
        assert_eq!(m.form.as_deref(), Some("tablet"));
        assert_eq!(m.route.as_deref(), Some("po"));
        assert_eq!(m.frequency.as_deref(), Some("tid"));
        assert!(!m.prn);
        assert_eq!(m.raw, "Amoxicillin 500mg tablet PO tid");
    }

    #[test]
    fn name_only_line_is_a_mention() {
        let m = parse_one("Metformin");
        assert_eq!(m.name, "Metformin");
        assert_eq!(m.strength, None);
        assert_eq!(m.frequency, None);
        assert!(!m.prn);
    }

    #[test]
    fn multi_word_name_is_bounded_by_first_token() {
        let m = parse_one("Vitamin D3 1000 iu once daily");
        assert_eq!(m.name, "Vitamin D3");
        assert_eq!(m.strength.as_deref(), Some("1000"));
        assert_eq!(m.unit.as_deref(), Some("iu"));
        assert_eq!(m.frequency.as_deref(), Some("once daily"));
    }

    #[test]
    fn list_markers_are_stripped_but_raw_keeps_them() {
        let text = "- Warfarin 5 mg\n* Lisinopril 10mg\n1. Aspirin 81mg";
        let mentions = parse_medication_lines(text);
        assert_eq!(mentions.len(), 3);
        assert_eq!(mentions[0].name, "Warfarin");
        assert_eq!(mentions[0].strength.as_deref(), Some("5"));
        assert_eq!(mentions[0].raw, "- Warfarin 5 mg");
        assert_eq!(mentions[1].name, "Lisinopril");
        assert_eq!(mentions[2].name, "Aspirin");
    }

    #[test]
    fn comma_and_semicolon_separators_work() {
        let m = parse_one("Aspirin, 81mg, po");
        assert_eq!(m.name, "Aspirin");
        assert_eq!(m.strength.as_deref(), Some("81"));
        assert_eq!(m.route.as_deref(), Some("po"));
    }

    #[test]
    fn by_mouth_route_and_wordy_frequency() {
        let m = parse_one("Tylenol 500mg by mouth twice daily");
        assert_eq!(m.route.as_deref(), Some("by mouth"));
        assert_eq!(m.frequency.as_deref(), Some("twice daily"));
    }

    #[test]
    fn interval_frequencies() {
        assert_eq!(
            parse_one("Ibuprofen 400mg po every 6 hours").frequency.as_deref(),
            Some("every 6 hours")
        );
        assert_eq!(parse_one("Morphine 2mg iv q4h").frequency.as_deref(), Some("q4h"));
    }

    #[test]
    fn prn_after_frequency_sets_flag() {
        let m = parse_one("Ibuprofen 200mg po q6h prn");
        assert_eq!(m.frequency.as_deref(), Some("q6h"));
        assert!(m.prn);
    }

    #[test]
    fn bare_prn_counts_as_both_frequency_and_flag() {
        let m = parse_one("Tylenol prn");
        assert_eq!(m.frequency.as_deref(), Some("prn"));
        assert!(m.prn);
    }

    #[test]
    fn matching_is_case_insensitive_but_name_keeps_case() {
        let m = parse_one("amoxicillin 500MG TABLET po TID");
        assert_eq!(m.name, "amoxicillin");
        assert_eq!(m.unit.as_deref(), Some("mg"));
        assert_eq!(m.form.as_deref(), Some("tablet"));
        assert_eq!(m.frequency.as_deref(), Some("tid"));
    }

    #[test]
    fn accented_names_parse() {
        let m = parse_one("Amoxicillín 500mg");
        assert_eq!(m.name, "Amoxicillín");
        assert_eq!(m.strength.as_deref(), Some("500"));
    }

    #[test]
    fn unrecognized_trailing_words_are_ignored() {
        let m = parse_one("Aspirin 81mg PO daily");
        assert_eq!(m.name, "Aspirin");
        assert_eq!(m.strength.as_deref(), Some("81"));
        assert_eq!(m.route.as_deref(), Some("po"));
        // "daily" alone is not in the frequency vocabulary
        assert_eq!(m.frequency, None);
    }

    #[test]
    fn subcutaneous_route_and_units() {
        let m = parse_one("insulin glargine 10 units subcut qhs");
        assert_eq!(m.name, "insulin glargine");
        assert_eq!(m.unit.as_deref(), Some("units"));
        assert_eq!(m.route.as_deref(), Some("subcut"));
        assert_eq!(m.frequency.as_deref(), Some("qhs"));
    }

    #[test]
    fn nameless_lines_are_dropped() {
        assert!(parse_medication_lines("500mg tablet").is_empty());
        assert!(parse_medication_lines("").is_empty());
        assert!(parse_medication_lines("   \n\n  ").is_empty());
    }

    #[test]
    fn vocabulary_words_inside_names_do_not_split() {
        // "po" in "potassium" and "tab" in "tabloid" must not bound the name
        let m = parse_one("potassium chloride 600mg");
        assert_eq!(m.name, "potassium chloride");
        assert_eq!(m.strength.as_deref(), Some("600"));
    }

    #[test]
    fn decimal_strengths() {
        let m = parse_one("Levothyroxine 0.05mg po qam");
        assert_eq!(m.strength.as_deref(), Some("0.05"));
        assert_eq!(m.frequency.as_deref(), Some("qam"));
    }

    #[test]
    fn one_mention_per_line() {
        let mentions = parse_medication_lines("Amoxicillin 500mg\nMetformin 850mg\n\nnot-a-med 12345");
        assert_eq!(mentions.len(), 3);
        assert_eq!(mentions[2].name, "not-a-med 12345");
    }
}
