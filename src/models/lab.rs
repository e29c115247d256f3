use serde::{Deserialize, Serialize};

use super::enums::{LabDirection, LabStatus};

/// One detected laboratory measurement, classified against its reference
/// range where one could be established.
///
/// `status` is `None` only when no usable range exists; when both bounds
/// are present, `high > low` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabEntry {
    /// Test name as found in the source text.
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub status: Option<LabStatus>,
    pub direction: Option<LabDirection>,
}

impl LabEntry {
    /// Whether a classifiable reference range is present.
    pub fn has_range(&self) -> bool {
        matches!((self.low, self.high), (Some(low), Some(high)) if high > low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(low: Option<f64>, high: Option<f64>) -> LabEntry {
        LabEntry {
            name: "Potassium".into(),
            value: 4.2,
            unit: Some("mmol/L".into()),
            low,
            high,
            status: None,
            direction: None,
        }
    }

    #[test]
    fn range_requires_both_bounds() {
        assert!(entry(Some(3.5), Some(5.0)).has_range());
        assert!(!entry(Some(3.5), None).has_range());
        assert!(!entry(None, Some(5.0)).has_range());
        assert!(!entry(None, None).has_range());
    }

    #[test]
    fn non_increasing_range_is_unusable() {
        assert!(!entry(Some(5.0), Some(5.0)).has_range());
        assert!(!entry(Some(5.0), Some(3.5)).has_range());
    }
}
