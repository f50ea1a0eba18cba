//! Kernel (regularized) parameter smoothing after resampling.

use demeter_model::{PARAM_DIM, ParamEnsemble};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::FilterError;
use crate::linalg::{SmallMat, SmallVec, column_means, covariance};

/// Relative diagonal inflation applied before factorizing the empirical
/// covariance. The allocation fractions sum to 1, so the covariance is
/// rank-deficient by construction and needs the regularization to admit a
/// Cholesky factor.
const JITTER_SCALE: f64 = 1e-9;

/// Shrinks each resampled particle's parameters toward the ensemble mean
/// and adds covariance-matched Gaussian noise:
///
/// `theta_i' = mean + h * (theta_i - mean) + sqrt(1 - h^2) * eps_i`,
/// `eps_i ~ N(0, Sigma_emp)`,
///
/// the standard kernel particle-filter rule: the ensemble's empirical
/// covariance is preserved while duplicated particles regain diversity.
/// `h = 1` keeps the resampled values untouched (early return, no RNG
/// use); `h = 0` is a full redraw from the Gaussian approximation.
///
/// Domain constraints (non-negativity, allocation closure) are the
/// caller's job; see [`crate::resample_move`].
///
/// # Errors
///
/// Returns [`FilterError::InvalidSmoothing`] for `h` outside [0, 1] and
/// [`FilterError::DegenerateCovariance`] if the covariance carries no
/// variance at all (fully collapsed ensemble) or cannot be factorized.
pub fn smooth_params(
    params: &mut ParamEnsemble,
    h: f64,
    rng: &mut impl Rng,
) -> Result<(), FilterError> {
    if !(0.0..=1.0).contains(&h) || h.is_nan() {
        return Err(FilterError::InvalidSmoothing { h });
    }
    if h == 1.0 {
        return Ok(());
    }

    let rows = params.to_rows();
    let means: SmallVec<PARAM_DIM> = column_means(&rows);
    let mut cov: SmallMat<PARAM_DIM> = covariance(&rows, &means);

    let max_diag = cov.max_diagonal();
    if !(max_diag > 0.0) || !max_diag.is_finite() {
        return Err(FilterError::DegenerateCovariance);
    }
    cov.add_diagonal(JITTER_SCALE * max_diag);
    let chol = cov.cholesky().ok_or(FilterError::DegenerateCovariance)?;

    let noise_scale = (1.0 - h * h).sqrt();
    let smoothed: Vec<[f64; PARAM_DIM]> = rows
        .iter()
        .map(|row| {
            let mut z = SmallVec::<PARAM_DIM>::zeros();
            for v in z.data.iter_mut() {
                *v = StandardNormal.sample(rng);
            }
            let eps = chol.mul_vec(&z);
            let mut out = [0.0; PARAM_DIM];
            for d in 0..PARAM_DIM {
                out[d] =
                    means.data[d] + h * (row[d] - means.data[d]) + noise_scale * eps.data[d];
            }
            out
        })
        .collect();

    *params = ParamEnsemble::from_rows(&smoothed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use demeter_model::Allocation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn jittered(rng: &mut StdRng, n: usize, base: f64, sd: f64) -> Vec<f64> {
        let dist = rand_distr::Normal::new(base, sd).unwrap();
        (0..n).map(|_| dist.sample(rng).abs()).collect()
    }

    /// Independent per-field draws so the empirical covariance is full rank.
    fn spread_params(n: usize) -> ParamEnsemble {
        let mut rng = StdRng::seed_from_u64(1234);
        let sla = jittered(&mut rng, n, 5.0, 0.6);
        let lue = jittered(&mut rng, n, 0.02, 0.004);
        let q10 = jittered(&mut rng, n, 2.0, 0.2);
        let r_basal = jittered(&mut rng, n, 0.2, 0.04);
        let litter_frac = jittered(&mut rng, n, 0.002, 0.0005);
        let mort_frac = jittered(&mut rng, n, 0.0005, 0.0001);
        let sigma_leaf = jittered(&mut rng, n, 0.1, 0.02);
        let sigma_wood = jittered(&mut rng, n, 0.1, 0.02);
        let sigma_soil = jittered(&mut rng, n, 0.1, 0.02);
        let alloc = (0..n)
            .map(|_| {
                let r = rng.random_range(0.3..0.6);
                let w = rng.random_range(0.1..0.3);
                Allocation::new(r, w, 1.0 - r - w)
            })
            .collect();
        ParamEnsemble::from_fields(
            sla, lue, q10, r_basal, litter_frac, mort_frac, sigma_leaf, sigma_wood, sigma_soil,
            alloc,
        )
        .unwrap()
    }

    #[test]
    fn test_h_one_is_identity() {
        let mut params = spread_params(30);
        let before = params.clone();
        let mut rng = StdRng::seed_from_u64(1);
        smooth_params(&mut params, 1.0, &mut rng).unwrap();
        assert_eq!(params, before);
    }

    #[test]
    fn test_h_below_one_perturbs() {
        let mut params = spread_params(30);
        let before = params.clone();
        let mut rng = StdRng::seed_from_u64(2);
        smooth_params(&mut params, 0.9, &mut rng).unwrap();
        assert_ne!(params, before);
    }

    #[test]
    fn test_invalid_h_rejected() {
        let mut params = spread_params(10);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            smooth_params(&mut params, -0.1, &mut rng),
            Err(FilterError::InvalidSmoothing { .. })
        ));
        assert!(matches!(
            smooth_params(&mut params, 1.1, &mut rng),
            Err(FilterError::InvalidSmoothing { .. })
        ));
        assert!(matches!(
            smooth_params(&mut params, f64::NAN, &mut rng),
            Err(FilterError::InvalidSmoothing { .. })
        ));
    }

    #[test]
    fn test_collapsed_ensemble_is_degenerate() {
        // Every particle identical: zero covariance, nothing to jitter.
        let row = spread_params(8).to_rows()[0];
        let mut params = ParamEnsemble::from_rows(&vec![row; 8]).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        assert!(matches!(
            smooth_params(&mut params, 0.5, &mut rng),
            Err(FilterError::DegenerateCovariance)
        ));
    }

    #[test]
    fn test_mean_approximately_preserved() {
        // The smoother is mean-preserving in expectation; with a seeded rng
        // and moderate noise the drift stays small relative to the spread.
        let n = 400;
        let mut params = spread_params(n);
        let before_rows = params.to_rows();
        let before_mean = column_means(&before_rows);

        let mut rng = StdRng::seed_from_u64(5);
        smooth_params(&mut params, 0.95, &mut rng).unwrap();
        let after_rows = params.to_rows();
        let after_mean = column_means(&after_rows);

        // sla column: sd 0.6, noise scale sqrt(1 - 0.95^2) ~ 0.31, so the
        // mean of 400 particles drifts by ~0.01; 0.15 is a generous bound.
        assert!((after_mean.data[0] - before_mean.data[0]).abs() < 0.15);
    }
}
