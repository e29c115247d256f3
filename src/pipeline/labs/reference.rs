use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ReferenceTableError;

static TRAILING_PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*$").unwrap());

/// Adult normal range for one lab test, with the aliases it appears under
/// on printed reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub unit: String,
    pub low: f64,
    pub high: f64,
}

/// Lookup table of canonical lab names, aliases, units, and adult normal
/// ranges. General-adult values only — no age/sex stratification.
pub struct ReferenceRangeTable {
    entries: Vec<ReferenceRange>,
}

impl ReferenceRangeTable {
    /// The compiled-in adult panel: CBC, basic metabolic panel, lipids,
    /// liver enzymes, thyroid.
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
        }
    }

    /// Load a table from a JSON file (array of entries in the same shape as
    /// the builtin panel). Entries with `low >= high` are rejected.
    pub fn load(path: &Path) -> Result<Self, ReferenceTableError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReferenceTableError::Load(path.display().to_string(), e.to_string())
        })?;
        let entries: Vec<ReferenceRange> = serde_json::from_str(&json).map_err(|e| {
            ReferenceTableError::Parse(path.display().to_string(), e.to_string())
        })?;
        for entry in &entries {
            if entry.low >= entry.high {
                return Err(ReferenceTableError::InvalidRange(
                    entry.canonical_name.clone(),
                ));
            }
        }
        Ok(Self { entries })
    }

    /// Look up a test by the name it carried in the source text.
    ///
    /// Matching is against normalized canonical names and aliases, so
    /// "Hemoglobin (Hgb)", "HGB", and "hemoglobin" all resolve to the same
    /// entry.
    pub fn lookup(&self, raw_name: &str) -> Option<&ReferenceRange> {
        let needle = normalize_lab_name(raw_name);
        if needle.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| {
            normalize_lab_name(&entry.canonical_name) == needle
                || entry
                    .aliases
                    .iter()
                    .any(|alias| normalize_lab_name(alias) == needle)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReferenceRangeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Normalize a lab-test name for matching: lowercase, collapse internal
/// whitespace, drop one trailing parenthetical ("Hemoglobin (Hgb)" →
/// "hemoglobin").
pub fn normalize_lab_name(name: &str) -> String {
    let stripped = TRAILING_PARENTHETICAL_RE.replace(name, "");
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn entry(
    canonical_name: &str,
    aliases: &[&str],
    unit: &str,
    low: f64,
    high: f64,
) -> ReferenceRange {
    ReferenceRange {
        canonical_name: canonical_name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        unit: unit.to_string(),
        low,
        high,
    }
}

fn builtin_entries() -> Vec<ReferenceRange> {
    vec![
        // CBC
        entry("hemoglobin", &["hgb", "hb"], "g/dL", 13.0, 17.0),
        entry("hematocrit", &["hct"], "%", 40.0, 52.0),
        entry(
            "white blood cell count",
            &["wbc", "white cell count", "leukocytes"],
            "10^3/uL",
            4.5,
            11.0,
        ),
        entry(
            "red blood cell count",
            &["rbc", "erythrocytes"],
            "10^6/uL",
            4.5,
            5.9,
        ),
        entry("platelet count", &["plt", "platelets"], "10^3/uL", 150.0, 450.0),
        // Basic metabolic panel
        entry(
            "glucose",
            &["blood glucose", "fasting glucose", "glu"],
            "mg/dL",
            70.0,
            100.0,
        ),
        entry("creatinine", &["creat", "cr"], "mg/dL", 0.7, 1.3),
        entry(
            "blood urea nitrogen",
            &["bun", "urea nitrogen"],
            "mg/dL",
            7.0,
            20.0,
        ),
        entry("sodium", &["na"], "mmol/L", 136.0, 145.0),
        entry("potassium", &["k"], "mmol/L", 3.5, 5.0),
        entry("chloride", &["cl"], "mmol/L", 98.0, 107.0),
        entry("bicarbonate", &["co2", "hco3"], "mmol/L", 22.0, 29.0),
        entry("calcium", &["ca"], "mg/dL", 8.5, 10.5),
        // Lipids
        entry(
            "total cholesterol",
            &["cholesterol"],
            "mg/dL",
            125.0,
            200.0,
        ),
        entry("ldl cholesterol", &["ldl", "ldl-c"], "mg/dL", 50.0, 130.0),
        entry("hdl cholesterol", &["hdl", "hdl-c"], "mg/dL", 40.0, 60.0),
        entry("triglycerides", &["tg"], "mg/dL", 50.0, 150.0),
        // Liver
        entry(
            "alanine aminotransferase",
            &["alt", "sgpt"],
            "U/L",
            7.0,
            56.0,
        ),
        entry(
            "aspartate aminotransferase",
            &["ast", "sgot"],
            "U/L",
            10.0,
            40.0,
        ),
        // Endocrine
        entry(
            "thyroid stimulating hormone",
            &["tsh"],
            "uIU/mL",
            0.4,
            4.0,
        ),
        entry("hemoglobin a1c", &["hba1c", "a1c"], "%", 4.0, 5.6),
    ]
}
