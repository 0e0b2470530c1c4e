//! Percentile bootstrap for the mean of a sample.
//!
//! [`estimate`] draws `resample_count` resamples (with replacement, same size as
//! the sample), records the mean of each, and reports the mean of those means
//! together with a percentile confidence interval.
//!
//! # Reproducibility
//!
//! Every call builds its own generator, so results depend only on the
//! arguments. The generator is [`rand_pcg::Pcg64`] constructed with
//! [`SeedableRng::seed_from_u64`], and each observation index is drawn with
//! [`Rng::random_range`]`(0..len)`, resample by resample, index by index.
//! Another generator reproduces the intervals only up to sampling noise.
//!
//! # Examples
//!
//! ```
//! use ppg_stats::bootstrap::{self, BootstrapSample};
//!
//! let sample = BootstrapSample::new(vec![1.0, 2.0, 3.0, 4.0])?;
//! let estimate = bootstrap::estimate(&sample, 2_000, 95.0, 42)?;
//!
//! assert!(estimate.lower <= estimate.mean && estimate.mean <= estimate.upper);
//! assert_eq!(estimate.resample_means.len(), 2_000);
//! # Ok::<(), ppg_stats::bootstrap::BootstrapError>(())
//! ```

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::{descriptive::DescriptiveStats, percentiles};

/// Largest sample [`BootstrapSample`] accepts.
///
/// Every resample draws one index per observation, so the cost of
/// [`estimate`] grows with `resample_count * len`.
pub const MAX_SAMPLE_LEN: usize = 100_000;

/// Invalid input to the bootstrap estimator.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum BootstrapError {
    #[display("bootstrap sample must contain at least one observation")]
    EmptySample,
    #[display("resample count must be at least 1")]
    InvalidResampleCount,
    #[display("confidence level must be strictly between 0 and 100, got {level}")]
    InvalidConfidenceLevel { level: f64 },
    #[display("bootstrap sample of {len} observations exceeds the limit of {}", MAX_SAMPLE_LEN)]
    SampleTooLarge { len: usize },
}

/// Observations for one player that the bootstrap resamples from.
///
/// Never empty and never longer than [`MAX_SAMPLE_LEN`].
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapSample {
    observations: Vec<f64>,
}

impl BootstrapSample {
    /// Creates a sample from explicit observations.
    pub fn new(observations: Vec<f64>) -> Result<Self, BootstrapError> {
        if observations.is_empty() {
            return Err(BootstrapError::EmptySample);
        }
        check_len(observations.len())?;
        Ok(Self { observations })
    }

    /// Creates a sample that repeats `value` once per trial.
    ///
    /// A season-long rate over `n` games becomes `n` identical observations.
    /// An unknown or zero trial count yields a single observation. The
    /// length is checked before anything is allocated.
    ///
    /// ```
    /// use ppg_stats::bootstrap::{BootstrapError, BootstrapSample};
    ///
    /// assert_eq!(BootstrapSample::repeated(3.0, Some(5))?.as_slice(), &[3.0; 5]);
    /// assert_eq!(BootstrapSample::repeated(3.0, None)?.len(), 1);
    /// assert_eq!(BootstrapSample::repeated(3.0, Some(0))?.len(), 1);
    /// assert!(matches!(
    ///     BootstrapSample::repeated(3.0, Some(usize::MAX)),
    ///     Err(BootstrapError::SampleTooLarge { .. })
    /// ));
    /// # Ok::<(), BootstrapError>(())
    /// ```
    pub fn repeated(value: f64, trials: Option<usize>) -> Result<Self, BootstrapError> {
        let len = trials.unwrap_or(1).max(1);
        check_len(len)?;
        Ok(Self {
            observations: vec![value; len],
        })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.observations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

fn check_len(len: usize) -> Result<(), BootstrapError> {
    if len > MAX_SAMPLE_LEN {
        return Err(BootstrapError::SampleTooLarge { len });
    }
    Ok(())
}

/// Result of a bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapEstimate {
    /// Mean of the resample means.
    pub mean: f64,
    /// Lower percentile bound.
    pub lower: f64,
    /// Upper percentile bound.
    pub upper: f64,
    /// Standard deviation of the resample means (bootstrap standard error).
    pub std_error: f64,
    /// Confidence level the bounds were computed at, in percent.
    pub confidence_level: f64,
    /// Every resample mean, in draw order.
    pub resample_means: Vec<f64>,
}

impl BootstrapEstimate {
    /// Width of the confidence interval (`upper - lower`).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Validates bootstrap parameters without running any resamples.
pub fn validate_params(resample_count: usize, confidence_level: f64) -> Result<(), BootstrapError> {
    if resample_count == 0 {
        return Err(BootstrapError::InvalidResampleCount);
    }
    // Written so that NaN is rejected too.
    if !(confidence_level > 0.0 && confidence_level < 100.0) {
        return Err(BootstrapError::InvalidConfidenceLevel {
            level: confidence_level,
        });
    }
    Ok(())
}

/// Runs a percentile bootstrap for the mean of `sample`.
///
/// The bounds are the `(100 - confidence_level) / 2` and
/// `100 - (100 - confidence_level) / 2` percentiles of the resample means,
/// interpolated linearly (see [`percentiles::compute_percentile`]).
///
/// # Errors
///
/// Returns an error if `resample_count` is zero or `confidence_level` is not
/// strictly between 0 and 100.
///
/// # Examples
///
/// A single observation collapses the interval onto that observation:
///
/// ```
/// use ppg_stats::bootstrap::{self, BootstrapSample};
///
/// let sample = BootstrapSample::repeated(2.75, None)?;
/// let estimate = bootstrap::estimate(&sample, 500, 90.0, 7)?;
/// assert_eq!(estimate.lower, 2.75);
/// assert_eq!(estimate.upper, 2.75);
/// assert_eq!(estimate.width(), 0.0);
/// # Ok::<(), ppg_stats::bootstrap::BootstrapError>(())
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn estimate(
    sample: &BootstrapSample,
    resample_count: usize,
    confidence_level: f64,
    seed: u64,
) -> Result<BootstrapEstimate, BootstrapError> {
    validate_params(resample_count, confidence_level)?;

    let observations = sample.as_slice();
    let len = observations.len();
    let mut rng = Pcg64::seed_from_u64(seed);

    let resample_means = (0..resample_count)
        .map(|_| {
            let sum = (0..len)
                .map(|_| observations[rng.random_range(0..len)])
                .sum::<f64>();
            sum / len as f64
        })
        .collect::<Vec<_>>();

    let mut sorted = resample_means.clone();
    sorted.sort_by(f64::total_cmp);
    let stats = DescriptiveStats::from_sorted(&sorted).ok_or(BootstrapError::InvalidResampleCount)?;

    let tail = (100.0 - confidence_level) / 2.0;
    let lower = percentiles::compute_percentile(&sorted, tail);
    let upper = percentiles::compute_percentile(&sorted, 100.0 - tail);

    Ok(BootstrapEstimate {
        mean: stats.mean,
        lower,
        upper,
        std_error: stats.std_dev,
        confidence_level,
        resample_means,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread_sample() -> BootstrapSample {
        BootstrapSample::new(vec![0.0, 1.0, 1.5, 2.0, 4.0, 5.5, 6.0, 9.0]).unwrap()
    }

    #[test]
    fn single_observation_collapses_interval() {
        for (resamples, level) in [(1, 50.0), (10, 95.0), (1_000, 99.9), (5_000, 0.1)] {
            let sample = BootstrapSample::repeated(1.234_567, None).unwrap();
            let estimate = estimate(&sample, resamples, level, 3).unwrap();
            assert_eq!(estimate.lower, 1.234_567);
            assert_eq!(estimate.upper, 1.234_567);
            assert_eq!(estimate.mean, 1.234_567);
        }
    }

    #[test]
    fn repeated_value_sample_is_degenerate() {
        let sample = BootstrapSample::repeated(3.0, Some(5)).unwrap();
        let estimate = estimate(&sample, 10_000, 95.0, 42).unwrap();
        assert_eq!(estimate.mean, 3.0);
        assert_eq!(estimate.lower, 3.0);
        assert_eq!(estimate.upper, 3.0);
        assert_eq!(estimate.std_error, 0.0);
    }

    #[test]
    fn same_seed_gives_identical_results() {
        let sample = spread_sample();
        let a = estimate(&sample, 3_000, 95.0, 20_250_929).unwrap();
        let b = estimate(&sample, 3_000, 95.0, 20_250_929).unwrap();
        assert_eq!(a.resample_means, b.resample_means);
        assert_eq!(a.mean.to_bits(), b.mean.to_bits());
        assert_eq!(a.lower.to_bits(), b.lower.to_bits());
        assert_eq!(a.upper.to_bits(), b.upper.to_bits());
    }

    #[test]
    fn different_seeds_draw_different_resamples() {
        let sample = spread_sample();
        let a = estimate(&sample, 500, 95.0, 11).unwrap();
        let b = estimate(&sample, 500, 95.0, 42).unwrap();
        assert_ne!(a.resample_means, b.resample_means);
    }

    #[test]
    fn interval_brackets_point_estimate() {
        let sample = spread_sample();
        for seed in [1, 11, 42, 99] {
            let estimate = estimate(&sample, 2_000, 95.0, seed).unwrap();
            assert!(estimate.lower <= estimate.mean);
            assert!(estimate.mean <= estimate.upper);
            assert!(estimate.width() > 0.0);
        }
    }

    #[test]
    fn point_estimate_is_close_to_sample_mean() {
        let sample = spread_sample();
        let sample_mean = sample.as_slice().iter().sum::<f64>() / 8.0;
        let estimate = estimate(&sample, 20_000, 95.0, 42).unwrap();
        assert!((estimate.mean - sample_mean).abs() < 0.05);
    }

    #[test]
    fn width_converges_with_more_resamples() {
        let sample = spread_sample();
        let widths = [20_000, 40_000]
            .map(|resamples| estimate(&sample, resamples, 95.0, 42).unwrap().width());
        let relative_change = (widths[0] - widths[1]).abs() / widths[1];
        assert!(relative_change < 0.05, "widths: {widths:?}");
    }

    #[test]
    fn higher_confidence_gives_wider_interval() {
        let sample = spread_sample();
        let narrow = estimate(&sample, 4_000, 80.0, 5).unwrap();
        let wide = estimate(&sample, 4_000, 99.0, 5).unwrap();
        assert!(wide.width() > narrow.width());
    }

    #[test]
    fn rejects_invalid_parameters() {
        let sample = spread_sample();
        assert_eq!(
            estimate(&sample, 0, 95.0, 42).unwrap_err(),
            BootstrapError::InvalidResampleCount
        );
        for level in [0.0, 100.0, -5.0, 120.0] {
            assert_eq!(
                estimate(&sample, 10, level, 42).unwrap_err(),
                BootstrapError::InvalidConfidenceLevel { level }
            );
        }
        assert!(matches!(
            estimate(&sample, 10, f64::NAN, 42),
            Err(BootstrapError::InvalidConfidenceLevel { .. })
        ));
    }

    #[test]
    fn rejects_empty_sample() {
        assert_eq!(
            BootstrapSample::new(vec![]).unwrap_err(),
            BootstrapError::EmptySample
        );
    }

    #[test]
    fn oversized_samples_are_rejected() {
        assert_eq!(
            BootstrapSample::repeated(1.0, Some(usize::MAX)).unwrap_err(),
            BootstrapError::SampleTooLarge { len: usize::MAX }
        );
        assert!(BootstrapSample::repeated(1.0, Some(MAX_SAMPLE_LEN)).is_ok());
        assert_eq!(
            BootstrapSample::new(vec![0.0; MAX_SAMPLE_LEN + 1]).unwrap_err(),
            BootstrapError::SampleTooLarge {
                len: MAX_SAMPLE_LEN + 1
            }
        );
    }
}
