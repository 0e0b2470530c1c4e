/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest order statistics: for
/// `n` values the percentile `p` sits at fractional rank `h = (n - 1) * p / 100`
/// and the result is `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.
/// Percentiles outside `0.0..=100.0` are clamped.
///
/// Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use ppg_stats::percentiles::compute_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let Some(&first) = sorted_values.first() else {
        return f64::NAN;
    };
    if sorted_values.len() == 1 {
        return first;
    }

    let rank = (sorted_values.len() - 1) as f64 * percentile.clamp(0.0, 100.0) / 100.0;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted_values.len() - 1);
    let fraction = rank - rank.floor();

    let lo = sorted_values[lower];
    let hi = sorted_values[upper];
    lo + fraction * (hi - lo)
}
