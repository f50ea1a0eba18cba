//! The vectorized stochastic process-model step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use crate::config::ModelConfig;
use crate::drivers::{Driver, StepDrivers};
use crate::error::ModelError;
use crate::params::{ParamEnsemble, ParticleParams};
use crate::state::{CarbonPools, NUM_VARS, OutputVar};

/// Advances every particle one timestep, returning one output row per
/// particle: the three updated pools followed by the diagnostic fluxes, in
/// [`OutputVar::ALL`] order.
///
/// Particles are independent and processed in parallel. Each particle gets
/// its own RNG seeded from `rng`, so results do not depend on thread
/// scheduling.
///
/// # Errors
///
/// Returns [`ModelError`] if the ensemble is empty or the state, parameter,
/// and driver lengths disagree.
pub fn step(
    state: &[CarbonPools],
    params: &ParamEnsemble,
    drivers: StepDrivers<'_>,
    config: &ModelConfig,
    rng: &mut impl Rng,
) -> Result<Vec<[f64; NUM_VARS]>, ModelError> {
    let mut flat = vec![0.0; state.len() * NUM_VARS];
    step_into(state, params, drivers, config, rng, &mut flat)?;
    Ok(flat
        .chunks_exact(NUM_VARS)
        .map(|row| {
            let mut arr = [0.0; NUM_VARS];
            arr.copy_from_slice(row);
            arr
        })
        .collect())
}

/// [`step`] writing into a pre-allocated flat buffer of
/// `state.len() * NUM_VARS` values, row-major by particle. Lets the
/// forecast engine fill its dense tensor without intermediate allocation.
///
/// # Errors
///
/// As [`step`], plus [`ModelError::BufferLengthMismatch`] if `out` has the
/// wrong length.
pub fn step_into(
    state: &[CarbonPools],
    params: &ParamEnsemble,
    drivers: StepDrivers<'_>,
    config: &ModelConfig,
    rng: &mut impl Rng,
    out: &mut [f64],
) -> Result<(), ModelError> {
    let n = state.len();
    if n == 0 {
        return Err(ModelError::EmptyEnsemble);
    }
    if params.len() != n {
        return Err(ModelError::LengthMismatch {
            name: "params",
            expected: n,
            got: params.len(),
        });
    }
    drivers.check_len(n)?;
    if out.len() != n * NUM_VARS {
        return Err(ModelError::BufferLengthMismatch {
            expected: n * NUM_VARS,
            got: out.len(),
        });
    }

    // One seed per particle from the master stream keeps the output
    // deterministic under any rayon schedule.
    let seeds: Vec<u64> = (0..n).map(|_| rng.random()).collect();
    let k = config.flux_to_pool();
    let night = config.night_par_threshold();
    let lai_conv = config.lai_conversion();

    out.par_chunks_exact_mut(NUM_VARS)
        .enumerate()
        .for_each(|(i, row)| {
            let mut particle_rng = StdRng::seed_from_u64(seeds[i]);
            step_particle(
                state[i],
                params.particle(i),
                drivers.get(i),
                k,
                night,
                lai_conv,
                &mut particle_rng,
                row,
            );
        });

    Ok(())
}

/// Single-particle update. Writes the 12 output values into `row`.
#[allow(clippy::too_many_arguments)]
fn step_particle(
    pools: CarbonPools,
    p: ParticleParams,
    driver: Driver,
    k: f64,
    night: f64,
    lai_conv: f64,
    rng: &mut StdRng,
    row: &mut [f64],
) {
    // Saturating light response on the pre-update leaf pool.
    let lai = pools.leaf * p.sla * lai_conv;
    let gpp = if driver.par > night {
        (p.lue * (1.0 - (-0.5 * lai).exp()) * driver.par).max(0.0)
    } else {
        0.0
    };

    let ra = gpp * p.alloc.respiration;
    let npp_wood = gpp * p.alloc.wood;
    let npp_leaf = gpp * p.alloc.leaf;

    let rh = (p.r_basal * pools.soil * p.q10.powf(driver.temp / 10.0)).max(0.0);

    // Turnover is a pool fraction, already in Mg/ha per timestep.
    let litterfall = pools.leaf * p.litter_frac;
    let mortality = pools.wood * p.mort_frac;

    let leaf = perturbed(pools.leaf + npp_leaf * k - litterfall, p.sigma_leaf, rng);
    let wood = perturbed(pools.wood + npp_wood * k - mortality, p.sigma_wood, rng);
    let soil = perturbed(pools.soil + litterfall + mortality - rh * k, p.sigma_soil, rng);

    row[OutputVar::LeafCarbon.index()] = leaf;
    row[OutputVar::WoodCarbon.index()] = wood;
    row[OutputVar::SoilCarbon.index()] = soil;
    // Diagnostic LAI reflects the updated leaf pool.
    row[OutputVar::Lai.index()] = leaf * p.sla * lai_conv;
    row[OutputVar::Gpp.index()] = gpp;
    row[OutputVar::Nep.index()] = gpp - ra - rh;
    row[OutputVar::AutotrophicResp.index()] = ra;
    row[OutputVar::WoodGrowth.index()] = npp_wood;
    row[OutputVar::LeafGrowth.index()] = npp_leaf;
    row[OutputVar::HeterotrophicResp.index()] = rh;
    row[OutputVar::Litterfall.index()] = litterfall;
    row[OutputVar::Mortality.index()] = mortality;
}

/// Normal process-error draw around `mean`, truncated at zero.
///
/// `sigma == 0` is deterministic; a negative or NaN sigma yields NaN, which
/// `f64::max` collapses to the zero floor (f64::max returns the non-NaN
/// operand).
fn perturbed(mean: f64, sigma: f64, rng: &mut StdRng) -> f64 {
    let draw = if sigma > 0.0 {
        match Normal::new(mean, sigma) {
            Ok(dist) => dist.sample(rng),
            Err(_) => f64::NAN,
        }
    } else if sigma == 0.0 {
        mean
    } else {
        f64::NAN
    };
    draw.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::Driver;
    use crate::params::Allocation;
    use rand::SeedableRng;

    fn noiseless_params(n: usize) -> ParamEnsemble {
        ParamEnsemble::from_fields(
            vec![5.0; n],
            vec![0.02; n],
            vec![2.0; n],
            vec![0.2; n],
            vec![0.001; n],
            vec![0.0002; n],
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
            vec![Allocation::new(0.5, 0.3, 0.2); n],
        )
        .unwrap()
    }

    #[test]
    fn test_row_layout_matches_output_vars() {
        let state = vec![CarbonPools::new(5.0, 100.0, 80.0)];
        let params = noiseless_params(1);
        let mut rng = StdRng::seed_from_u64(1);
        let rows = step(
            &state,
            &params,
            StepDrivers::Broadcast(Driver::new(10.0, 800.0)),
            &ModelConfig::new(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        let row = rows[0];
        // Pools first, diagnostics after.
        assert!(row[OutputVar::Gpp.index()] > 0.0);
        assert_eq!(
            row[OutputVar::Lai.index()],
            row[OutputVar::LeafCarbon.index()] * 5.0 * 0.1
        );
    }

    #[test]
    fn test_night_forces_zero_gpp() {
        let state = vec![CarbonPools::new(5.0, 100.0, 80.0); 4];
        let params = noiseless_params(4);
        let mut rng = StdRng::seed_from_u64(7);
        let rows = step(
            &state,
            &params,
            StepDrivers::Broadcast(Driver::new(10.0, 0.0)),
            &ModelConfig::new(),
            &mut rng,
        )
        .unwrap();

        for row in rows {
            assert_eq!(row[OutputVar::Gpp.index()], 0.0);
            assert_eq!(row[OutputVar::AutotrophicResp.index()], 0.0);
            assert_eq!(row[OutputVar::WoodGrowth.index()], 0.0);
            assert_eq!(row[OutputVar::LeafGrowth.index()], 0.0);
        }
    }

    #[test]
    fn test_noiseless_pool_updates_closed_form() {
        let leaf0 = 5.0;
        let wood0 = 100.0;
        let soil0 = 80.0;
        let state = vec![CarbonPools::new(leaf0, wood0, soil0)];
        let params = noiseless_params(1);
        let config = ModelConfig::new();
        let mut rng = StdRng::seed_from_u64(3);

        // Night with temp fixed at 10 C: Rh = 0.2 * 80 * 2^(1) = 32.
        let rows = step(
            &state,
            &params,
            StepDrivers::Broadcast(Driver::new(10.0, 0.0)),
            &config,
            &mut rng,
        )
        .unwrap();
        let row = rows[0];

        let litter = leaf0 * 0.001;
        let cwd = wood0 * 0.0002;
        let rh = 0.2 * soil0 * 2.0_f64;
        let k = config.flux_to_pool();

        approx::assert_abs_diff_eq!(row[OutputVar::HeterotrophicResp.index()], rh, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(row[OutputVar::LeafCarbon.index()], leaf0 - litter, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(row[OutputVar::WoodCarbon.index()], wood0 - cwd, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(
            row[OutputVar::SoilCarbon.index()],
            soil0 + litter + cwd - rh * k,
            epsilon = 1e-12
        );
        approx::assert_abs_diff_eq!(row[OutputVar::Nep.index()], -rh, epsilon = 1e-12);
    }

    #[test]
    fn test_state_never_negative_under_adversarial_params() {
        let n = 64;
        // High turnover plus huge process noise tries to drive pools negative.
        let params = ParamEnsemble::from_fields(
            vec![5.0; n],
            vec![0.02; n],
            vec![2.0; n],
            vec![5.0; n],
            vec![0.9; n],
            vec![0.9; n],
            vec![50.0; n],
            vec![50.0; n],
            vec![50.0; n],
            vec![Allocation::new(0.5, 0.3, 0.2); n],
        )
        .unwrap();

        let mut state = vec![CarbonPools::new(0.5, 1.0, 2.0); n];
        let config = ModelConfig::new();
        let mut rng = StdRng::seed_from_u64(11);

        for t in 0..20 {
            let rows = step(
                &state,
                &params,
                StepDrivers::Broadcast(Driver::new(25.0, if t % 2 == 0 { 0.0 } else { 1200.0 })),
                &config,
                &mut rng,
            )
            .unwrap();
            for (i, row) in rows.iter().enumerate() {
                state[i] = CarbonPools::new(
                    row[OutputVar::LeafCarbon.index()],
                    row[OutputVar::WoodCarbon.index()],
                    row[OutputVar::SoilCarbon.index()],
                );
                assert!(state[i].is_valid(), "negative pool at step {t}");
            }
        }
    }

    #[test]
    fn test_negative_sigma_collapses_to_floor() {
        let n = 1;
        let params = ParamEnsemble::from_fields(
            vec![5.0; n],
            vec![0.02; n],
            vec![2.0; n],
            vec![0.2; n],
            vec![0.001; n],
            vec![0.0002; n],
            vec![-1.0; n], // invalid draw a prior should never produce
            vec![0.0; n],
            vec![0.0; n],
            vec![Allocation::new(0.5, 0.3, 0.2); n],
        )
        .unwrap();
        let state = vec![CarbonPools::new(5.0, 100.0, 80.0)];
        let mut rng = StdRng::seed_from_u64(5);
        let rows = step(
            &state,
            &params,
            StepDrivers::Broadcast(Driver::new(10.0, 0.0)),
            &ModelConfig::new(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(rows[0][OutputVar::LeafCarbon.index()], 0.0);
    }

    #[test]
    fn test_deterministic_given_seed() {
        let state = vec![CarbonPools::new(5.0, 100.0, 80.0); 32];
        let params = ParamEnsemble::from_fields(
            vec![5.0; 32],
            vec![0.02; 32],
            vec![2.0; 32],
            vec![0.2; 32],
            vec![0.001; 32],
            vec![0.0002; 32],
            vec![0.3; 32],
            vec![0.3; 32],
            vec![0.3; 32],
            vec![Allocation::new(0.5, 0.3, 0.2); 32],
        )
        .unwrap();
        let config = ModelConfig::new();
        let drivers = Driver::new(15.0, 900.0);

        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let a = step(&state, &params, StepDrivers::Broadcast(drivers), &config, &mut rng_a).unwrap();
        let b = step(&state, &params, StepDrivers::Broadcast(drivers), &config, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_buffer_length_checked() {
        let state = vec![CarbonPools::new(5.0, 100.0, 80.0)];
        let params = noiseless_params(1);
        let mut rng = StdRng::seed_from_u64(1);
        let mut out = vec![0.0; NUM_VARS - 1];
        let err = step_into(
            &state,
            &params,
            StepDrivers::Broadcast(Driver::new(10.0, 0.0)),
            &ModelConfig::new(),
            &mut rng,
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::BufferLengthMismatch { .. }));
    }
}
