use serde::{Deserialize, Serialize};

use crate::numeric::is_positive_finite;

/// Structured summary of one consultation session: condition, demographics,
/// and candidate drugs, distilled from the transcript.
///
/// Every field is optional; a partially filled context is the normal state,
/// not an error. Numeric fields are either absent or finite and positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseContext {
    /// Raw source transcript, retained so extraction can re-run later.
    pub transcript: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub age_years: Option<f64>,
    pub weight_kg: Option<f64>,
    /// Unique, insertion order preserved.
    #[serde(default)]
    pub drug_suggestions: Vec<String>,
}

impl CaseContext {
    /// Whether enough is known to skip re-extraction: condition,
    /// demographics, and at least one drug suggestion are all present.
    pub fn is_complete(&self) -> bool {
        non_empty(&self.condition)
            && self.age_years.is_some()
            && self.weight_kg.is_some()
            && !self.drug_suggestions.is_empty()
    }

    /// Merge a newer extraction into this context.
    ///
    /// Asymmetric by design: a field is overwritten only when the newer
    /// value is non-null/non-empty, so merging can add information but
    /// never regress a known field back to unknown.
    pub fn merge_from(&mut self, newer: &CaseContext) {
        merge_string(&mut self.transcript, &newer.transcript);
        merge_string(&mut self.condition, &newer.condition);
        merge_string(&mut self.description, &newer.description);
        merge_number(&mut self.age_years, newer.age_years);
        merge_number(&mut self.weight_kg, newer.weight_kg);
        if !newer.drug_suggestions.is_empty() {
            self.drug_suggestions = dedup_preserving_order(newer.drug_suggestions.clone());
        }
    }

    /// Union fresh suggestions with the stored list: fresh first, then
    /// stored, de-duplicated keeping first appearance, truncated to `cap`.
    pub fn merge_suggestions(&mut self, fresh: &[String], cap: usize) {
        let mut combined: Vec<String> = fresh
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        combined.extend(self.drug_suggestions.iter().cloned());
        let mut merged = dedup_preserving_order(combined);
        merged.truncate(cap);
        self.drug_suggestions = merged;
    }
}

/// Caller-supplied partial update for a stored context.
///
/// `None` means "leave alone"; present values follow the same
/// non-empty-overwrites rule as extraction merges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseContextPatch {
    pub transcript: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub age_years: Option<f64>,
    pub weight_kg: Option<f64>,
    pub drug_suggestions: Option<Vec<String>>,
}

impl CaseContextPatch {
    pub fn apply_to(&self, context: &mut CaseContext) {
        merge_string(&mut context.transcript, &self.transcript);
        merge_string(&mut context.condition, &self.condition);
        merge_string(&mut context.description, &self.description);
        merge_number(&mut context.age_years, self.age_years);
        merge_number(&mut context.weight_kg, self.weight_kg);
        if let Some(suggestions) = &self.drug_suggestions {
            let cleaned: Vec<String> = suggestions
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !cleaned.is_empty() {
                context.drug_suggestions = dedup_preserving_order(cleaned);
            }
        }
    }
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn merge_string(target: &mut Option<String>, newer: &Option<String>) {
    if let Some(value) = newer.as_deref() {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *target = Some(trimmed.to_string());
        }
    }
}

fn merge_number(target: &mut Option<f64>, newer: Option<f64>) {
    if let Some(value) = newer {
        if is_positive_finite(value) {
            *target = Some(value);
        }
    }
}

/// First occurrence wins; order preserved.
pub(crate) fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_context() -> CaseContext {
        CaseContext {
            transcript: Some("patient transcript".into()),
            condition: Some("otitis media".into()),
            description: Some("ear pain for three days".into()),
            age_years: Some(45.0),
            weight_kg: Some(70.0),
            drug_suggestions: vec!["amoxicillin".into(), "azithromycin".into()],
        }
    }

    #[test]
    fn empty_context_is_incomplete() {
        assert!(!CaseContext::default().is_complete());
    }

    #[test]
    fn full_context_is_complete() {
        assert!(full_context().is_complete());
    }

    #[test]
    fn each_missing_field_breaks_completeness() {
        let mut c = full_context();
        c.condition = Some("   ".into());
        assert!(!c.is_complete());

        let mut c = full_context();
        c.age_years = None;
        assert!(!c.is_complete());

        let mut c = full_context();
        c.weight_kg = None;
        assert!(!c.is_complete());

        let mut c = full_context();
        c.drug_suggestions.clear();
        assert!(!c.is_complete());
    }

    #[test]
    fn merge_never_erases_known_fields() {
        let mut stored = full_context();
        let empty_extraction = CaseContext::default();
        let before = stored.clone();

        stored.merge_from(&empty_extraction);
        assert_eq!(stored, before);
    }

    #[test]
    fn merge_fills_missing_fields() {
        let mut stored = CaseContext {
            condition: Some("pneumonia".into()),
            ..CaseContext::default()
        };
        let newer = CaseContext {
            age_years: Some(62.0),
            weight_kg: Some(81.5),
            drug_suggestions: vec!["azithromycin".into()],
            ..CaseContext::default()
        };

        stored.merge_from(&newer);
        assert_eq!(stored.condition.as_deref(), Some("pneumonia"));
        assert_eq!(stored.age_years, Some(62.0));
        assert_eq!(stored.weight_kg, Some(81.5));
        assert_eq!(stored.drug_suggestions, vec!["azithromycin"]);
    }

    #[test]
    fn merge_overwrites_with_newer_non_empty_values() {
        let mut stored = full_context();
        let newer = CaseContext {
            condition: Some("acute otitis media".into()),
            age_years: Some(46.0),
            ..CaseContext::default()
        };

        stored.merge_from(&newer);
        assert_eq!(stored.condition.as_deref(), Some("acute otitis media"));
        assert_eq!(stored.age_years, Some(46.0));
        // untouched fields survive
        assert_eq!(stored.weight_kg, Some(70.0));
    }

    #[test]
    fn merge_rejects_non_positive_numbers() {
        let mut stored = full_context();
        let newer = CaseContext {
            age_years: Some(-1.0),
            weight_kg: Some(0.0),
            ..CaseContext::default()
        };

        stored.merge_from(&newer);
        assert_eq!(stored.age_years, Some(45.0));
        assert_eq!(stored.weight_kg, Some(70.0));
    }

    #[test]
    fn merge_whitespace_string_does_not_erase() {
        let mut stored = full_context();
        let newer = CaseContext {
            condition: Some("   ".into()),
            ..CaseContext::default()
        };

        stored.merge_from(&newer);
        assert_eq!(stored.condition.as_deref(), Some("otitis media"));
    }

    #[test]
    fn merge_suggestions_fresh_first_dedup_capped() {
        let mut context = CaseContext {
            drug_suggestions: vec!["amoxicillin".into(), "cefdinir".into()],
            ..CaseContext::default()
        };

        context.merge_suggestions(
            &["azithromycin".into(), "amoxicillin".into()],
            15,
        );
        assert_eq!(
            context.drug_suggestions,
            vec!["azithromycin", "amoxicillin", "cefdinir"]
        );
    }

    #[test]
    fn merge_suggestions_respects_cap() {
        let mut context = CaseContext::default();
        let fresh: Vec<String> = (0..20).map(|i| format!("drug-{i}")).collect();

        context.merge_suggestions(&fresh, 15);
        assert_eq!(context.drug_suggestions.len(), 15);
        assert_eq!(context.drug_suggestions[0], "drug-0");
        assert_eq!(context.drug_suggestions[14], "drug-14");
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut context = full_context();
        let patch = CaseContextPatch {
            condition: Some("sinusitis".into()),
            ..CaseContextPatch::default()
        };

        patch.apply_to(&mut context);
        assert_eq!(context.condition.as_deref(), Some("sinusitis"));
        assert_eq!(context.age_years, Some(45.0));
        assert_eq!(context.drug_suggestions.len(), 2);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let deduped = dedup_preserving_order(vec![
            "a".into(),
            "b".into(),
            "a".into(),
            "c".into(),
            "b".into(),
        ]);
        assert_eq!(deduped, vec!["a", "b", "c"]);
    }
}
