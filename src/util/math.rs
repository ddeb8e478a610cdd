//! Numeric helpers shared by region reduction and report statistics.

/// Floors `len * fraction` in double precision, saturating at zero.
pub(crate) fn floor_fraction(len: usize, fraction: f64) -> usize {
    let value = (len as f64 * fraction).floor();
    if value <= 0.0 {
        0
    } else {
        value as usize
    }
}

/// Returns `part / whole * 100`, or zero when `whole` is zero.
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Returns the arithmetic mean, or zero for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
