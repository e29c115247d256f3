//! Two-stage lab result extraction.
//!
//! Stage 1 asks the oracle for a `{"labs": [...]}` object. Stage 2 is a
//! deterministic line grammar that runs only when stage 1 produced
//! nothing usable (oracle down, garbage output, or an empty list).
//! Either way, every candidate is resolved against the reference table
//! (name canonicalization, range backfill, de-duplication), classified,
//! and finally filtered down to entries that carry an actionable signal.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::models::LabEntry;
use crate::oracle::{json, OracleClient};
use crate::pipeline::labs::classify::classify;
use crate::pipeline::labs::grammar::{scan_lab_lines, LabCandidate};
use crate::pipeline::labs::prompt::{build_lab_prompt, LAB_SYSTEM_PROMPT};
use crate::pipeline::labs::reference::{normalize_lab_name, ReferenceRangeTable};

pub struct LabExtractor {
    client: Arc<dyn OracleClient>,
    table: ReferenceRangeTable,
    band_fraction: f64,
}

impl LabExtractor {
    pub fn new(
        client: Arc<dyn OracleClient>,
        table: ReferenceRangeTable,
        band_fraction: f64,
    ) -> Self {
        Self {
            client,
            table,
            band_fraction,
        }
    }

    /// Extractor with the built-in reference panel.
    pub fn from_config(client: Arc<dyn OracleClient>, config: &PipelineConfig) -> Self {
        Self::new(client, ReferenceRangeTable::builtin(), config.band_fraction)
    }

    /// Pull lab results out of free text and classify each against its
    /// reference range. Never fails; an unreachable oracle degrades to
    /// the line grammar, and text with no recognizable labs yields an
    /// empty list.
    pub fn extract_and_classify(&self, text: &str) -> Vec<LabEntry> {
        let mut entries = match self
            .client
            .generate(LAB_SYSTEM_PROMPT, &build_lab_prompt(text))
        {
            Ok(raw) => self.resolve(parse_lab_response(&raw)),
            Err(e) => {
                tracing::warn!(error = %e, "lab oracle call failed, using line grammar");
                Vec::new()
            }
        };

        if entries.is_empty() {
            tracing::debug!("no usable oracle labs, scanning lines");
            entries = self.resolve(scan_lab_lines(text));
        }

        for entry in &mut entries {
            let (status, direction) =
                classify(entry.value, entry.low, entry.high, self.band_fraction);
            entry.status = status;
            entry.direction = direction;
        }

        entries
            .into_iter()
            .filter(|e| e.has_range() || e.status.is_some())
            .collect()
    }

    /// Resolve raw candidates: canonicalize names against the table,
    /// backfill absent or non-increasing ranges (and a missing unit)
    /// from it, and merge exact duplicates.
    fn resolve(&self, candidates: Vec<LabCandidate>) -> Vec<LabEntry> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for candidate in candidates {
            if !candidate.value.is_finite() {
                continue;
            }
            let name = candidate.name.trim().to_string();
            if name.is_empty() {
                continue;
            }

            let reference = self.table.lookup(&name);
            let canonical_name = reference
                .map(|r| r.canonical_name.clone())
                .unwrap_or_else(|| normalize_lab_name(&name));

            let mut unit = candidate.unit;
            let mut low = candidate.low;
            let mut high = candidate.high;
            let range_usable = matches!((low, high), (Some(l), Some(h)) if h > l);
            if !range_usable {
                if let Some(reference) = reference {
                    if low.is_some() && high.is_some() {
                        // explicit but non-increasing, cannot be trusted
                        low = Some(reference.low);
                        high = Some(reference.high);
                    } else {
                        low = low.or(Some(reference.low));
                        high = high.or(Some(reference.high));
                        if matches!((low, high), (Some(l), Some(h)) if h <= l) {
                            low = Some(reference.low);
                            high = Some(reference.high);
                        }
                    }
                    if unit.is_none() {
                        unit = Some(reference.unit.clone());
                    }
                }
            }

            let key = (
                canonical_name,
                candidate.value.to_bits(),
                unit.clone().unwrap_or_default(),
                low.map(f64::to_bits),
                high.map(f64::to_bits),
            );
            if !seen.insert(key) {
                continue;
            }

            entries.push(LabEntry {
                name,
                value: candidate.value,
                unit,
                low,
                high,
                status: None,
                direction: None,
            });
        }

        entries
    }
}

fn parse_lab_response(raw: &str) -> Vec<LabCandidate> {
    let object = json::extract_object(raw);
    json::array_field(&object, "labs")
        .iter()
        .filter_map(|item| {
            let item = item.as_object()?;
            Some(LabCandidate {
                name: json::str_field(item, "name")?,
                value: json::number_field(item, "value")?,
                unit: json::str_field(item, "unit"),
                low: json::number_field(item, "low"),
                high: json::number_field(item, "high"),
            })
        })
        .collect()
}
