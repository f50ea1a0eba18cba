//! Statistical helper functions for the Demeter ecosystem forecaster.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator (matching R's `var()`).
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Sample standard deviation with N-1 denominator (matching R's `sd()`).
/// Returns 0.0 if fewer than 2 elements.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// R's default quantile algorithm (type=7).
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Median of pre-sorted data. For even length, averages the middle two values.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median: input must not be empty");
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Weighted mean. Returns 0.0 if the weight sum is not strictly positive.
pub fn weighted_mean(data: &[f64], weights: &[f64]) -> f64 {
    let wsum: f64 = weights.iter().sum();
    if wsum <= 0.0 {
        return 0.0;
    }
    data.iter()
        .zip(weights.iter())
        .map(|(&x, &w)| x * w)
        .sum::<f64>()
        / wsum
}

/// Weighted quantile via the weighted empirical CDF.
///
/// Sorts (value, weight) pairs by value, then returns the first value whose
/// cumulative normalized weight reaches `p`. Falls back to the unweighted
/// type-7 quantile if the weight sum is not strictly positive.
///
/// # Panics
///
/// Panics if `data` is empty or lengths differ.
pub fn weighted_quantile(data: &[f64], weights: &[f64], p: f64) -> f64 {
    assert!(!data.is_empty(), "weighted_quantile: input must not be empty");
    assert_eq!(
        data.len(),
        weights.len(),
        "weighted_quantile: data/weights length mismatch"
    );

    let mut pairs: Vec<(f64, f64)> = data
        .iter()
        .copied()
        .zip(weights.iter().copied())
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total: f64 = pairs.iter().map(|&(_, w)| w).sum();
    if total <= 0.0 {
        let sorted: Vec<f64> = pairs.iter().map(|&(x, _)| x).collect();
        return quantile_type7(&sorted, p);
    }

    let target = p * total;
    let mut acc = 0.0;
    for &(x, w) in &pairs {
        acc += w;
        if acc >= target {
            return x;
        }
    }
    pairs[pairs.len() - 1].0
}

/// Normal probability density (matching R's `dnorm()`).
///
/// Returns 0.0 for a non-finite or non-positive `sd`, so a degenerate
/// observation uncertainty drops a particle instead of producing infinities.
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    if sd <= 0.0 || !sd.is_finite() {
        return 0.0;
    }
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * std::f64::consts::PI).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sd(&data), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn test_sd_single() {
        assert_eq!(sd(&[5.0]), 0.0);
    }

    #[test]
    fn test_quantile_type7() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile_type7(&sorted, 0.25), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_quantile_type7_median() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile_type7(&sorted, 0.5), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_median_odd() {
        assert_relative_eq!(median(&[1.0, 2.0, 3.0]), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_median_even() {
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_weighted_mean_uniform_matches_mean() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let w = [0.25; 4];
        assert_relative_eq!(weighted_mean(&data, &w), mean(&data), epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_mean_zero_weights() {
        assert_eq!(weighted_mean(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_weighted_quantile_point_mass() {
        // All mass on one value: every quantile is that value.
        let data = [1.0, 5.0, 9.0];
        let w = [0.0, 1.0, 0.0];
        assert_eq!(weighted_quantile(&data, &w, 0.025), 5.0);
        assert_eq!(weighted_quantile(&data, &w, 0.5), 5.0);
        assert_eq!(weighted_quantile(&data, &w, 0.975), 5.0);
    }

    #[test]
    fn test_weighted_quantile_uniform_median() {
        let data = [4.0, 1.0, 3.0, 2.0, 5.0];
        let w = [1.0; 5];
        let med = weighted_quantile(&data, &w, 0.5);
        assert!((2.0..=3.0).contains(&med));
    }

    #[test]
    fn test_weighted_quantile_extremes() {
        let data = [9.0, 1.0, 5.0];
        let w = [1.0, 1.0, 1.0];
        assert_eq!(weighted_quantile(&data, &w, 0.0), 1.0);
        assert_eq!(weighted_quantile(&data, &w, 1.0), 9.0);
    }

    #[test]
    fn test_normal_pdf_peak() {
        // dnorm(0, 0, 1) = 1/sqrt(2*pi)
        let want = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
        assert_relative_eq!(normal_pdf(0.0, 0.0, 1.0), want, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_pdf_symmetry() {
        assert_relative_eq!(
            normal_pdf(1.5, 0.0, 2.0),
            normal_pdf(-1.5, 0.0, 2.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_normal_pdf_degenerate_sd() {
        assert_eq!(normal_pdf(1.0, 1.0, 0.0), 0.0);
        assert_eq!(normal_pdf(1.0, 1.0, -2.0), 0.0);
        assert_eq!(normal_pdf(1.0, 1.0, f64::NAN), 0.0);
    }
}
