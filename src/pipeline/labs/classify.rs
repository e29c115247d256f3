use crate::models::{LabDirection, LabStatus};

/// Floor for the borderline band so a degenerate range width cannot
/// collapse it to zero.
const MIN_BAND: f64 = 1e-9;

/// Classify a lab value against its reference range.
///
/// Values outside `[low, high]` are abnormal with a direction. Values
/// inside but within `band = max((high - low) * band_fraction, ε)` of
/// either boundary are borderline. No usable range (either bound missing,
/// or `high <= low`) means no classification at all.
pub fn classify(
    value: f64,
    low: Option<f64>,
    high: Option<f64>,
    band_fraction: f64,
) -> (Option<LabStatus>, Option<LabDirection>) {
    let (Some(low), Some(high)) = (low, high) else {
        return (None, None);
    };
    if !low.is_finite() || !high.is_finite() || high <= low {
        return (None, None);
    }

    if value < low {
        return (Some(LabStatus::Abnormal), Some(LabDirection::Low));
    }
    if value > high {
        return (Some(LabStatus::Abnormal), Some(LabDirection::High));
    }

    let band = ((high - low) * band_fraction).max(MIN_BAND);
    if value - low <= band || high - value <= band {
        return (Some(LabStatus::Borderline), None);
    }

    (Some(LabStatus::Normal), None)
}
