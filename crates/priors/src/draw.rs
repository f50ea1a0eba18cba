//! Drawing the initial ensemble from priors.

use demeter_model::{Allocation, CarbonPools, ParamEnsemble};
use rand::Rng;

use crate::error::PriorError;
use crate::spec::ParameterPriors;

/// Draws an N-particle parameter ensemble from the priors.
///
/// Field draws happen in schema order with a single RNG stream, so a
/// seeded run is reproducible.
///
/// # Errors
///
/// Returns [`PriorError::EmptyDraw`] for `n == 0` or
/// [`PriorError::InvalidSpec`] for an invalid distribution.
pub fn draw_parameters(
    priors: &ParameterPriors,
    n: usize,
    rng: &mut impl Rng,
) -> Result<ParamEnsemble, PriorError> {
    if n == 0 {
        return Err(PriorError::EmptyDraw);
    }

    let sla = priors.sla.draw_vec("sla", n, rng)?;
    let lue = priors.lue.draw_vec("lue", n, rng)?;
    let q10 = priors.q10.draw_vec("q10", n, rng)?;
    let r_basal = priors.r_basal.draw_vec("r_basal", n, rng)?;
    let litterfall = priors.litterfall.draw_vec("litterfall", n, rng)?;
    let mortality = priors.mortality.draw_vec("mortality", n, rng)?;
    let sigma_leaf = priors.sigma_leaf.draw_vec("sigma_leaf", n, rng)?;
    let sigma_wood = priors.sigma_wood.draw_vec("sigma_wood", n, rng)?;
    let sigma_soil = priors.sigma_soil.draw_vec("sigma_soil", n, rng)?;
    let alloc = priors
        .alloc
        .draw_vec(n, rng)?
        .into_iter()
        .map(|[respiration, wood, leaf]| Allocation::new(respiration, wood, leaf))
        .collect();

    let params = ParamEnsemble::from_fields(
        sla, lue, q10, r_basal, litterfall, mortality, sigma_leaf, sigma_wood, sigma_soil, alloc,
    )?;
    Ok(params)
}

/// Draws the N-particle initial carbon pools from the priors.
///
/// # Errors
///
/// As [`draw_parameters`].
pub fn draw_initial_state(
    priors: &ParameterPriors,
    n: usize,
    rng: &mut impl Rng,
) -> Result<Vec<CarbonPools>, PriorError> {
    if n == 0 {
        return Err(PriorError::EmptyDraw);
    }
    let leaf = priors.initial_leaf.draw_vec("initial_leaf", n, rng)?;
    let wood = priors.initial_wood.draw_vec("initial_wood", n, rng)?;
    let soil = priors.initial_soil.draw_vec("initial_soil", n, rng)?;
    Ok(leaf
        .into_iter()
        .zip(wood)
        .zip(soil)
        .map(|((l, w), s)| CarbonPools::new(l, w, s))
        .collect())
}
