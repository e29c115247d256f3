use serde::{Deserialize, Serialize};

/// One medication as parsed from a free-text line.
///
/// `name` is the only required field; everything else is `None` when the
/// line did not carry it. An absent field is never an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationMention {
    pub name: String,
    pub strength: Option<String>,
    pub unit: Option<String>,
    pub form: Option<String>,
    pub route: Option<String>,
    pub frequency: Option<String>,
    pub prn: bool,
    /// The source line verbatim. Canonicalization re-derives structure from
    /// this rather than trusting the partial parse.
    pub raw: String,
}

impl MedicationMention {
    /// The line handed to the mapping oracle: the verbatim source when
    /// present, otherwise reassembled from parsed fields.
    pub fn source_line(&self) -> String {
        let raw = self.raw.trim();
        if !raw.is_empty() {
            return raw.to_string();
        }
        let mut parts: Vec<String> = vec![self.name.clone()];
        if let (Some(strength), Some(unit)) = (&self.strength, &self.unit) {
            parts.push(format!("{strength}{unit}"));
        }
        for field in [&self.form, &self.route, &self.frequency] {
            if let Some(value) = field {
                parts.push(value.clone());
            }
        }
        if self.prn {
            parts.push("prn".to_string());
        }
        parts.join(" ")
    }
}

/// A medication mention after canonicalization.
///
/// Parsed fields are carried over, overridden where the mapping oracle was
/// more confident. `canonical_id` is the stable grouping key; entries in a
/// batch sharing one are flagged `duplicate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMedication {
    pub name: String,
    pub strength: Option<String>,
    pub unit: Option<String>,
    pub form: Option<String>,
    pub route: Option<String>,
    pub frequency: Option<String>,
    pub prn: bool,
    pub raw: String,
    pub canonical_id: String,
    pub canonical_name: Option<String>,
    pub duplicate: bool,
}
