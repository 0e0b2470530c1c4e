//! Pearson and Spearman correlation.
//!
//! Both functions return `None` when the coefficient is undefined: fewer than
//! two paired observations, mismatched lengths, or zero variance in either
//! variable.

use std::f64::consts::PI;

/// Pearson correlation with its two-sided significance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// Pearson's r, in `-1.0..=1.0`.
    pub coefficient: f64,
    /// Two-sided p-value for the null hypothesis of zero correlation,
    /// from Student's t distribution with `n - 2` degrees of freedom.
    pub p_value: f64,
    /// Number of paired observations.
    pub n: usize,
}

/// Computes Pearson's r and its two-sided p-value.
///
/// With exactly two observations the coefficient is always ±1 and the
/// p-value is 1.0.
///
/// # Examples
///
/// ```
/// use ppg_stats::correlation;
///
/// let shots = [10.0, 20.0, 30.0, 40.0];
/// let goals = [2.0, 4.0, 6.0, 8.0];
/// let corr = correlation::pearson(&shots, &goals).unwrap();
/// assert!((corr.coefficient - 1.0).abs() < 1e-12);
///
/// assert!(correlation::pearson(&[1.0], &[2.0]).is_none());
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<Correlation> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let coefficient = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let p_value = two_sided_p_value(coefficient, n);
    Some(Correlation {
        coefficient,
        p_value,
        n,
    })
}

/// Computes Spearman's rho: Pearson's r over average ranks.
///
/// # Examples
///
/// ```
/// use ppg_stats::correlation;
///
/// // Monotonic but not linear.
/// let rho = correlation::spearman(&[1.0, 2.0, 3.0, 4.0], &[1.0, 8.0, 27.0, 64.0]).unwrap();
/// assert!((rho - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }
    pearson(&average_ranks(x), &average_ranks(y)).map(|c| c.coefficient)
}

/// Assigns 1-based ranks, giving tied values the mean of the ranks they span.
#[expect(clippy::cast_precision_loss)]
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let value = values[order[start]];
        let end = order[start..]
            .iter()
            .position(|&i| values[i].total_cmp(&value).is_ne())
            .map_or(order.len(), |offset| start + offset);
        // ranks start..end (0-based) average to (start + end - 1) / 2, plus 1
        let rank = (start + end - 1) as f64 / 2.0 + 1.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

#[expect(clippy::cast_precision_loss)]
fn two_sided_p_value(r: f64, n: usize) -> f64 {
    if n <= 2 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    // P(|T| >= |t|) with t = r * sqrt(df / (1 - r^2)) equals I_{1 - r^2}(df / 2, 1 / 2).
    let x = (1.0 - r * r).clamp(0.0, 1.0);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    // The continued fraction converges quickly only on this side of the mode.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Modified Lentz evaluation of the incomplete beta continued fraction.
#[expect(clippy::cast_precision_loss)]
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let even = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + even * d);
        c = guard(1.0 + even / c);
        h *= d * c;

        let odd = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + odd * d);
        c = guard(1.0 + odd / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

/// Natural log of the gamma function (Lanczos, g = 7).
#[expect(clippy::cast_precision_loss)]
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // reflection formula
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + G + 0.5;
    let series = COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + i as f64));
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn ln_gamma_matches_factorials() {
        assert_close(ln_gamma(1.0), 0.0, 1e-12);
        assert_close(ln_gamma(5.0), 24.0_f64.ln(), 1e-12);
        assert_close(ln_gamma(0.5), PI.sqrt().ln(), 1e-12);
    }

    #[test]
    fn incomplete_beta_known_values() {
        // I_x(1, 1) is the uniform CDF.
        assert_close(regularized_incomplete_beta(1.0, 1.0, 0.3), 0.3, 1e-12);
        // Symmetric parameters are 1/2 at the midpoint.
        assert_close(regularized_incomplete_beta(2.5, 2.5, 0.5), 0.5, 1e-12);
        assert_close(regularized_incomplete_beta(2.0, 3.0, 0.0), 0.0, 0.0);
        assert_close(regularized_incomplete_beta(2.0, 3.0, 1.0), 1.0, 0.0);
    }

    #[test]
    fn pearson_with_p_value_for_three_degrees_of_freedom() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let corr = pearson(&x, &y).unwrap();
        assert_eq!(corr.n, 5);
        assert_close(corr.coefficient, 6.0 / 60.0_f64.sqrt(), 1e-12);
        // t = sqrt(4.5), df = 3: p = 1 - (2/pi)(atan(t/sqrt3) + (t/sqrt3) / (1 + t^2/3))
        let u = 4.5_f64.sqrt() / 3.0_f64.sqrt();
        let expected = 1.0 - 2.0 / PI * (u.atan() + u / (1.0 + u * u));
        assert_close(corr.p_value, expected, 1e-9);
    }

    #[test]
    fn pearson_with_p_value_for_one_degree_of_freedom() {
        let x = [10.0, 20.0, 30.0];
        let y = [3.0, 2.0, 9.0];
        let corr = pearson(&x, &y).unwrap();
        let r = corr.coefficient;
        let t = r * (1.0 / (1.0 - r * r)).sqrt();
        // Cauchy: P(|T| >= |t|) = 1 - (2/pi) atan(|t|)
        assert_close(corr.p_value, 1.0 - 2.0 / PI * t.abs().atan(), 1e-9);
    }

    #[test]
    fn perfect_correlation_has_zero_p_value() {
        let corr = pearson(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]).unwrap();
        assert_close(corr.coefficient, -1.0, 1e-12);
        assert_close(corr.p_value, 0.0, 1e-12);
    }

    #[test]
    fn two_points_have_unit_p_value() {
        let corr = pearson(&[1.0, 2.0], &[5.0, 3.0]).unwrap();
        assert_close(corr.coefficient, -1.0, 1e-12);
        assert_close(corr.p_value, 1.0, 0.0);
    }

    #[test]
    fn undefined_cases() {
        assert!(pearson(&[], &[]).is_none());
        assert!(pearson(&[1.0], &[1.0]).is_none());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_none());
        assert!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(spearman(&[1.0, 2.0], &[4.0]).is_none());
    }

    #[test]
    fn average_ranks_handle_ties() {
        assert_eq!(
            average_ranks(&[10.0, 20.0, 10.0, 30.0]),
            vec![1.5, 3.0, 1.5, 4.0]
        );
    }

    #[test]
    fn spearman_reversed_order() {
        let rho = spearman(&[0.0, 1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0, 0.0]).unwrap();
        assert_close(rho, -1.0, 1e-12);
    }
}
