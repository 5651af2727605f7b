//! Numeric helpers shared by the scoring stages.

/// Round to two decimal places (half away from zero).
///
/// # Examples
/// ```
/// use engagelens_models::utils::round2;
/// assert_eq!(round2(33.333), 33.33);
/// assert_eq!(round2(66.666), 66.67);
/// ```
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, or `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
