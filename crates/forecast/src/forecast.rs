//! Sequential forecast iteration.

use demeter_model::{CarbonPools, DriverSeries, ModelConfig, ModelError, ParamEnsemble};
use rand::Rng;
use tracing::debug;

use crate::error::ForecastError;
use crate::output::ForecastOutput;

/// Runs a full-horizon ensemble forecast.
///
/// The horizon is the driver series length. Returns the dense output
/// tensor with NaN/infinite values already coerced to zero.
///
/// # Errors
///
/// Returns [`ForecastError`] if the ensemble is empty, lengths disagree,
/// or the driver series is empty.
pub fn run_forecast(
    initial: &[CarbonPools],
    params: &ParamEnsemble,
    drivers: &DriverSeries,
    config: &ModelConfig,
    rng: &mut impl Rng,
) -> Result<ForecastOutput, ForecastError> {
    let n_steps = drivers.n_steps();
    if n_steps == 0 {
        return Err(ForecastError::InsufficientDrivers {
            available: 0,
            needed: 1,
        });
    }
    let mut output = ForecastOutput::zeros(n_steps, initial.len());
    fill_segment(&mut output, 0, n_steps, initial, params, drivers, config, rng)?;
    Ok(output)
}

/// Fills steps `[start, end)` of a preallocated tensor, threading the state
/// forward from `initial`, and returns the state after the last filled
/// step. The assimilation loop uses this to interleave analyses between
/// forecast steps.
///
/// Each filled segment is sanitized: NaN/infinite values become zero
/// (logged at debug level), so downstream likelihoods always see finite
/// predictions.
///
/// # Errors
///
/// Returns [`ForecastError::InvalidSegment`] for an empty or out-of-range
/// segment, [`ForecastError::InsufficientDrivers`] if the drivers end
/// before `end`, or a [`ModelError`] from the step itself.
#[allow(clippy::too_many_arguments)]
pub fn fill_segment(
    output: &mut ForecastOutput,
    start: usize,
    end: usize,
    initial: &[CarbonPools],
    params: &ParamEnsemble,
    drivers: &DriverSeries,
    config: &ModelConfig,
    rng: &mut impl Rng,
) -> Result<Vec<CarbonPools>, ForecastError> {
    if start >= end || end > output.n_steps() {
        return Err(ForecastError::InvalidSegment {
            start,
            end,
            n_steps: output.n_steps(),
        });
    }
    if drivers.n_steps() < end {
        return Err(ForecastError::InsufficientDrivers {
            available: drivers.n_steps(),
            needed: end,
        });
    }
    let n = output.n_particles();
    if initial.len() != n {
        return Err(ForecastError::Model(ModelError::LengthMismatch {
            name: "initial state",
            expected: n,
            got: initial.len(),
        }));
    }

    let mut state = initial.to_vec();
    for t in start..end {
        let step_drivers = drivers.at(t)?;
        {
            let seg = output.segment_mut(t, t + 1);
            demeter_model::step_into(&state, params, step_drivers, config, rng, seg)?;
        }
        let clamped = output.sanitize_segment(t, t + 1);
        if clamped > 0 {
            debug!(step = t, clamped, "coerced non-finite forecast values to zero");
        }
        // Next step starts from this step's (sanitized) pool columns.
        state = output.state_at(t)?;
    }
    Ok(state)
}
