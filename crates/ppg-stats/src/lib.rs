//! Statistical kernels for roster scoring-rate analysis.
//!
//! This crate provides the numeric building blocks used by `ppg-analysis`:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Percentiles**: linearly interpolated percentiles over finite samples
//! - **Bootstrap**: seeded percentile bootstrap for the mean of a sample
//! - **Correlation**: Pearson's r with a two-sided p-value, Spearman's rho
//!
//! Nothing here performs I/O or keeps state between calls.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Interpolated percentile of sorted data
//! - [`bootstrap`]: Resampling distribution of the mean and its confidence interval
//! - [`correlation`]: Linear and rank correlation
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use ppg_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::from_sorted(&values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Bootstrapping a confidence interval
//!
//! ```
//! use ppg_stats::bootstrap::{self, BootstrapSample};
//!
//! // Five games at a steady 3.0 points per game.
//! let sample = BootstrapSample::repeated(3.0, Some(5))?;
//! let estimate = bootstrap::estimate(&sample, 10_000, 95.0, 42)?;
//! assert_eq!((estimate.lower, estimate.mean, estimate.upper), (3.0, 3.0, 3.0));
//! # Ok::<(), ppg_stats::bootstrap::BootstrapError>(())
//! ```
//!
//! ## Correlating two fields
//!
//! ```
//! use ppg_stats::correlation;
//!
//! let corr = correlation::pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 7.0]).unwrap();
//! assert!(corr.coefficient > 0.9);
//! ```

pub mod bootstrap;
pub mod correlation;
pub mod descriptive;
pub mod percentiles;
