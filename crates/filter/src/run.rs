//! The sequential assimilation loop.

use demeter_forecast::{ForecastOutput, fill_segment};
use demeter_model::{DriverSeries, ModelConfig};
use rand::Rng;
use tracing::{debug, info};

use crate::analysis::{AnalysisRecord, analysis_step};
use crate::config::FilterConfig;
use crate::ensemble::Ensemble;
use crate::error::FilterError;
use crate::history::ParameterHistory;
use crate::observation::ObservationSeries;

/// Everything a finished assimilation run produces: the dense forecast
/// tensor, the final ensemble, the parameter history, and the
/// per-analysis diagnostics.
#[derive(Debug)]
pub struct AssimilationResult {
    output: ForecastOutput,
    ensemble: Ensemble,
    history: ParameterHistory,
    records: Vec<AnalysisRecord>,
}

impl AssimilationResult {
    /// The full `[step][particle][variable]` tensor.
    pub fn output(&self) -> &ForecastOutput {
        &self.output
    }

    /// The posterior ensemble after the last step.
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// The parameter snapshot history.
    pub fn history(&self) -> &ParameterHistory {
        &self.history
    }

    /// Per-analysis ESS/resample records, oldest first.
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    /// Decomposes the result into its parts.
    pub fn into_parts(
        self,
    ) -> (
        ForecastOutput,
        Ensemble,
        ParameterHistory,
        Vec<AnalysisRecord>,
    ) {
        (self.output, self.ensemble, self.history, self.records)
    }
}

/// Runs the full forecast-analysis loop over the driver horizon.
///
/// The loop advances one timestep at a time: a forecast step fills row t
/// of the tensor, then, if step t maps to an observation slot, the
/// analysis updates weights and possibly resamples. The ensemble is
/// threaded by value; the tensor keeps the forecasted (pre-analysis)
/// trajectories.
///
/// # Errors
///
/// Returns [`FilterError`] on invalid configuration, an observation
/// series too short for the horizon, or a failed forecast/analysis step.
pub fn run_assimilation(
    initial: Ensemble,
    drivers: &DriverSeries,
    observations: &ObservationSeries,
    model_config: &ModelConfig,
    filter_config: &FilterConfig,
    rng: &mut impl Rng,
) -> Result<AssimilationResult, FilterError> {
    model_config.validate()?;
    filter_config.validate()?;

    let n_steps = drivers.n_steps();
    let n = initial.len();
    let needed = observations.slots_for_horizon(n_steps);
    if observations.n_slots() < needed {
        return Err(FilterError::ObservationCoverage {
            needed,
            got: observations.n_slots(),
        });
    }

    info!(
        n_particles = n,
        n_steps,
        cadence = observations.cadence(),
        observed = %filter_config.observed(),
        resample = filter_config.resample(),
        "starting assimilation run"
    );

    let mut output = ForecastOutput::zeros(n_steps, n);
    let mut history = ParameterHistory::new();
    let mut records = Vec::new();
    let mut ensemble = initial;

    for t in 0..n_steps {
        // Forecast one step from the current analysis state.
        let (state, params, weights) = ensemble.into_parts();
        let new_state = fill_segment(
            &mut output,
            t,
            t + 1,
            &state,
            &params,
            drivers,
            model_config,
            rng,
        )?;
        ensemble = Ensemble::new(new_state, params, weights)?;

        let Some(slot) = observations.slot_for_step(t) else {
            continue;
        };
        let obs = observations.slot(slot);
        if obs.is_none() {
            debug!(step = t, slot, "missing observation, analysis skipped");
            continue;
        }

        let predicted = output.var_at(t, filter_config.observed())?;
        let (analyzed, record) =
            analysis_step(ensemble, &predicted, obs, filter_config, t, rng)?;
        ensemble = analyzed;

        if let Some(record) = record {
            info!(
                step = t,
                slot,
                ess = record.ess,
                resampled = record.resampled,
                "analysis complete"
            );
            history.record(t, ensemble.params().clone(), record.resampled);
            records.push(record);
        }
    }

    info!(
        n_analyses = records.len(),
        n_resamples = history.n_resamples(),
        "assimilation run finished"
    );

    Ok(AssimilationResult {
        output,
        ensemble,
        history,
        records,
    })
}
