//! Small descriptive-statistics helpers shared by the aggregator and the
//! significance checks.

/// Rounds to two decimal places, ties to even. Non-finite values pass
/// through unchanged.
pub(crate) fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    (value * 100.0).round_ties_even() / 100.0
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value, or the mean of the two middle values for even lengths.
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|left, right| left.total_cmp(right));
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

/// Bessel-corrected standard deviation; `0.0` for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let center = mean(values);
    let squared = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>();
    (squared / (values.len() - 1) as f64).sqrt()
}

pub(crate) fn positive_count(values: &[f64]) -> usize {
    values.iter().filter(|value| **value > 0.0).count()
}

pub(crate) fn positive_rate(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    positive_count(values) as f64 / values.len() as f64
}
