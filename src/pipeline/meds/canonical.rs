//! Batch canonicalization against the mapping oracle.
//!
//! The whole batch goes out in one request as index-prefixed lines; the
//! response maps each index to generic-name and dose fields. Items with a
//! missing, non-integer, or out-of-range index are discarded so a
//! malformed response can never corrupt unrelated entries. When the
//! oracle is unreachable or unparseable every mention keeps its parsed
//! fields and the lowercased parsed name stands in as the canonical name,
//! which keeps duplicate detection working offline.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::models::{CanonicalMedication, MedicationMention};
use crate::oracle::{json, OracleClient};
use crate::pipeline::meds::prompt::{build_mapping_prompt, MAPPING_SYSTEM_PROMPT};
use crate::pipeline::meds::slug::{canonical_slug, short_hash};

pub struct MedicationCanonicalizer {
    client: Arc<dyn OracleClient>,
}

/// Fields the mapping oracle returned for one input line.
#[derive(Debug, Default, Clone)]
struct MappedFields {
    generic: Option<String>,
    strength: Option<String>,
    unit: Option<String>,
    form: Option<String>,
    route: Option<String>,
    frequency: Option<String>,
    prn: Option<bool>,
}

impl MedicationCanonicalizer {
    pub fn new(client: Arc<dyn OracleClient>) -> Self {
        Self { client }
    }

    /// Canonicalize a parsed batch. Output is index-aligned with the
    /// input; every entry carries a non-empty deterministic
    /// `canonical_id` and entries sharing one are flagged as duplicates.
    pub fn canonicalize(&self, mentions: &[MedicationMention]) -> Vec<CanonicalMedication> {
        if mentions.is_empty() {
            return Vec::new();
        }

        let lines: Vec<String> = mentions
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{i}. {}", m.source_line()))
            .collect();

        let mapping = match self
            .client
            .generate(MAPPING_SYSTEM_PROMPT, &build_mapping_prompt(&lines))
        {
            Ok(raw) => parse_mapping_response(&raw, mentions.len()),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    batch = mentions.len(),
                    "mapping oracle call failed, keeping parsed fields"
                );
                vec![None; mentions.len()]
            }
        };

        let mut medications: Vec<CanonicalMedication> = mentions
            .iter()
            .zip(mapping)
            .map(|(mention, mapped)| resolve(mention, mapped))
            .collect();
        mark_duplicates(&mut medications);
        medications
    }
}

fn parse_mapping_response(raw: &str, batch_len: usize) -> Vec<Option<MappedFields>> {
    let object = json::extract_object(raw);
    let mut mapping: Vec<Option<MappedFields>> = vec![None; batch_len];

    for item in json::array_field(&object, "mapped") {
        let Some(item) = item.as_object() else {
            continue;
        };
        // as_u64 rejects negative and fractional indexes outright
        let Some(index) = item.get("index").and_then(Value::as_u64) else {
            continue;
        };
        let index = index as usize;
        if index >= batch_len {
            continue;
        }
        mapping[index] = Some(MappedFields {
            generic: json::str_field(item, "generic"),
            strength: json::str_field(item, "strength"),
            unit: json::str_field(item, "unit"),
            form: json::str_field(item, "form"),
            route: json::str_field(item, "route"),
            frequency: json::str_field(item, "frequency"),
            prn: json::bool_field(item, "prn"),
        });
    }
    mapping
}

/// Oracle fields win; anything it left null falls back to the parse. The
/// display name falls back to the lowercased parsed name, and the slug of
/// whichever name won becomes the identifier, with a stable hash standing
/// in when the slug comes out empty.
fn resolve(mention: &MedicationMention, mapped: Option<MappedFields>) -> CanonicalMedication {
    let mapped = mapped.unwrap_or_default();
    let canonical_name = mapped
        .generic
        .map(|g| g.to_lowercase())
        .unwrap_or_else(|| mention.name.to_lowercase());
    let canonical_id =
        canonical_slug(&canonical_name).unwrap_or_else(|| short_hash(&mention.name));

    CanonicalMedication {
        name: mention.name.clone(),
        strength: mapped.strength.or_else(|| mention.strength.clone()),
        unit: mapped.unit.or_else(|| mention.unit.clone()),
        form: mapped.form.or_else(|| mention.form.clone()),
        route: mapped.route.or_else(|| mention.route.clone()),
        frequency: mapped.frequency.or_else(|| mention.frequency.clone()),
        prn: mapped.prn.unwrap_or(mention.prn),
        raw: mention.raw.clone(),
        canonical_id,
        canonical_name: Some(canonical_name),
        duplicate: false,
    }
}

fn mark_duplicates(medications: &mut [CanonicalMedication]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for m in medications.iter() {
        if m.canonical_id.is_empty() {
            continue;
        }
        *counts.entry(m.canonical_id.clone()).or_insert(0) += 1;
    }
    for m in medications.iter_mut() {
        m.duplicate =
            !m.canonical_id.is_empty() && counts.get(&m.canonical_id).copied().unwrap_or(0) >= 2;
    }
}
