//! Multinomial resampling and the resample-move transaction.

use rand::Rng;

use crate::ensemble::Ensemble;
use crate::error::FilterError;
use crate::smoother::smooth_params;

/// Draws `n_draws` indices with replacement, each with probability
/// proportional to its weight.
///
/// Builds a CDF and uses binary search (`partition_point`) for each draw.
/// The last CDF entry is forced to 1.0 to eliminate floating-point edge
/// cases.
///
/// # Errors
///
/// Returns [`FilterError::DegenerateWeights`] if the weight sum is zero,
/// negative, or non-finite.
pub fn multinomial_indices(
    weights: &[f64],
    n_draws: usize,
    rng: &mut impl Rng,
) -> Result<Vec<usize>, FilterError> {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(FilterError::DegenerateWeights { sum: total });
    }

    let mut cdf = Vec::with_capacity(weights.len());
    let mut acc = 0.0;
    for &w in weights {
        acc += w / total;
        cdf.push(acc);
    }
    if let Some(last) = cdf.last_mut() {
        *last = 1.0;
    }

    let mut out = Vec::with_capacity(n_draws);
    for _ in 0..n_draws {
        let u: f64 = rng.random();
        let idx = cdf.partition_point(|&c| c < u).min(weights.len() - 1);
        out.push(idx);
    }
    Ok(out)
}

/// The resample-move transaction: multinomial resampling of particle
/// indices by weight, value-copy reindexing of state and every parameter
/// field, kernel smoothing of the resampled parameters, constraint
/// enforcement, and a weight reset to 1.
///
/// Consumes the ensemble and returns a new one; on error nothing of the
/// input survives partially modified. With `h = 1` the smoothing and
/// constraint passes are skipped: the resampled values are already
/// constrained and must come through exactly.
///
/// # Errors
///
/// Returns [`FilterError::DegenerateWeights`] for a massless weight
/// vector, [`FilterError::InvalidSmoothing`]/[`FilterError::DegenerateCovariance`]
/// from the smoother, or a constraint failure from the parameter bundle.
pub fn resample_move(
    ensemble: Ensemble,
    h: f64,
    rng: &mut impl Rng,
) -> Result<Ensemble, FilterError> {
    if !(0.0..=1.0).contains(&h) || h.is_nan() {
        return Err(FilterError::InvalidSmoothing { h });
    }

    let n = ensemble.len();
    let (state, params, weights) = ensemble.into_parts();

    let indices = multinomial_indices(&weights, n, rng)?;

    let new_state = indices.iter().map(|&i| state[i]).collect();
    let mut new_params = params.gather(&indices)?;
    if h < 1.0 {
        smooth_params(&mut new_params, h, rng)?;
        new_params.constrain()?;
    }

    // Resampling already folded the likelihood into the particle set.
    Ensemble::new(new_state, new_params, vec![1.0; n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use demeter_model::{Allocation, CarbonPools, ParamEnsemble};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn marker_ensemble(n: usize, weights: Vec<f64>) -> Ensemble {
        // Tag every particle: field values encode the particle index so
        // co-location of state and parameters survives scrutiny.
        let params = ParamEnsemble::from_fields(
            (0..n).map(|i| i as f64).collect(), // sla is the marker
            vec![0.02; n],
            vec![2.0; n],
            vec![0.2; n],
            vec![0.001; n],
            vec![0.0002; n],
            (0..n).map(|i| 100.0 + i as f64).collect(),
            vec![0.1; n],
            vec![0.1; n],
            vec![Allocation::new(0.5, 0.3, 0.2); n],
        )
        .unwrap();
        let state = (0..n)
            .map(|i| CarbonPools::new(i as f64, 1000.0 + i as f64, 80.0))
            .collect();
        Ensemble::new(state, params, weights).unwrap()
    }

    #[test]
    fn test_heaviest_weight_selected_most() {
        let mut weights = vec![1.0; 10];
        weights[7] = 50.0;

        let mut counts = vec![0usize; 10];
        for trial in 0..300 {
            let mut rng = StdRng::seed_from_u64(trial);
            let idx = multinomial_indices(&weights, 10, &mut rng).unwrap();
            for i in idx {
                counts[i] += 1;
            }
        }
        let max_idx = counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, c)| *c)
            .unwrap()
            .0;
        assert_eq!(max_idx, 7);
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let weights = [0.0, 1.0, 0.0, 1.0];
        let mut rng = StdRng::seed_from_u64(42);
        let idx = multinomial_indices(&weights, 500, &mut rng).unwrap();
        assert!(idx.iter().all(|&i| i == 1 || i == 3));
    }

    #[test]
    fn test_degenerate_weights_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            multinomial_indices(&[0.0, 0.0], 2, &mut rng),
            Err(FilterError::DegenerateWeights { .. })
        ));
        assert!(matches!(
            multinomial_indices(&[f64::NAN, 1.0], 2, &mut rng),
            Err(FilterError::DegenerateWeights { .. })
        ));
    }

    #[test]
    fn test_index_alignment_preserved() {
        let ensemble = marker_ensemble(16, (1..=16).map(|i| i as f64).collect());
        let mut rng = StdRng::seed_from_u64(9);
        let resampled = resample_move(ensemble, 1.0, &mut rng).unwrap();

        // Every particle's state and parameters must name the same source.
        for i in 0..resampled.len() {
            let src = resampled.params().particle(i).sla as usize;
            assert_eq!(resampled.state()[i].leaf, src as f64);
            assert_eq!(resampled.state()[i].wood, 1000.0 + src as f64);
            assert_eq!(resampled.params().particle(i).sigma_leaf, 100.0 + src as f64);
        }
    }

    #[test]
    fn test_h_one_keeps_resampled_values_exactly() {
        let ensemble = marker_ensemble(8, vec![1.0; 8]);
        let source = ensemble.params().clone();
        let mut rng = StdRng::seed_from_u64(10);
        let resampled = resample_move(ensemble, 1.0, &mut rng).unwrap();

        for i in 0..resampled.len() {
            let src = resampled.params().particle(i).sla as usize;
            let got = resampled.params().particle(i);
            let want = source.particle(src);
            assert_eq!(got.sla, want.sla);
            assert_eq!(got.sigma_leaf, want.sigma_leaf);
            assert_eq!(got.alloc, want.alloc);
        }
    }

    #[test]
    fn test_weights_reset_to_one() {
        let ensemble = marker_ensemble(8, vec![0.1, 3.0, 0.5, 0.2, 1.0, 0.9, 2.0, 0.01]);
        let mut rng = StdRng::seed_from_u64(11);
        let resampled = resample_move(ensemble, 1.0, &mut rng).unwrap();
        assert_eq!(resampled.weights(), &[1.0; 8][..]);
    }

    #[test]
    fn test_allocation_closure_after_smoothing() {
        // Spread-out parameters so smoothing has a usable covariance.
        let n = 64;
        let params = ParamEnsemble::from_fields(
            (0..n).map(|i| 4.0 + 0.05 * i as f64).collect(),
            (0..n).map(|i| 0.02 + 0.0001 * i as f64).collect(),
            (0..n).map(|i| 1.8 + 0.01 * i as f64).collect(),
            (0..n).map(|i| 0.1 + 0.002 * i as f64).collect(),
            (0..n).map(|i| 0.001 + 0.0001 * i as f64).collect(),
            (0..n).map(|i| 0.0001 + 0.00005 * i as f64).collect(),
            (0..n).map(|i| 0.05 + 0.001 * i as f64).collect(),
            (0..n).map(|i| 0.05 + 0.002 * i as f64).collect(),
            (0..n).map(|i| 0.05 + 0.003 * i as f64).collect(),
            (0..n)
                .map(|i| {
                    let r = 0.3 + 0.003 * (i % 11) as f64;
                    let w = 0.4 - 0.002 * (i % 13) as f64;
                    Allocation::new(r, w, 1.0 - r - w)
                })
                .collect(),
        )
        .unwrap();
        let state = vec![CarbonPools::new(5.0, 100.0, 80.0); n];
        let ensemble = Ensemble::new(state, params, vec![1.0; n]).unwrap();

        let mut rng = StdRng::seed_from_u64(12);
        let resampled = resample_move(ensemble, 0.9, &mut rng).unwrap();

        for i in 0..n {
            let a = resampled.params().particle(i).alloc;
            assert!(a.is_closed(1e-9), "particle {i} allocation {a:?} not closed");
        }
    }
}
