//! Importance-weight updates from observation likelihoods.

use demeter_forecast::ForecastOutput;
use demeter_model::OutputVar;
use demeter_stats::normal_pdf;

use crate::error::FilterError;
use crate::ess::effective_sample_size;
use crate::observation::{Observation, ObservationSeries};

/// Multiplies each particle's weight by the Normal likelihood of its
/// predicted value under `obs`. The online/recursive update of the
/// resampling filter: weights stay un-normalized.
///
/// # Errors
///
/// Returns [`FilterError::LengthMismatch`] if `predicted` and `weights`
/// disagree in length.
pub fn update_weights(
    weights: &mut [f64],
    predicted: &[f64],
    obs: Observation,
) -> Result<(), FilterError> {
    if predicted.len() != weights.len() {
        return Err(FilterError::LengthMismatch {
            name: "predicted",
            expected: weights.len(),
            got: predicted.len(),
        });
    }
    for (w, &pred) in weights.iter_mut().zip(predicted.iter()) {
        *w *= normal_pdf(obs.value, pred, obs.sd);
    }
    Ok(())
}

/// Cumulative weights of the non-resampling particle filter.
///
/// Row j holds every particle's running likelihood product after
/// observation slots 0..=j; `ess[j]` is the matching effective sample
/// size, reported as a pure diagnostic.
#[derive(Debug, Clone)]
pub struct CumulativeWeights {
    per_slot: Vec<Vec<f64>>,
    ess: Vec<f64>,
}

impl CumulativeWeights {
    /// Per-slot weight rows, oldest first.
    pub fn per_slot(&self) -> &[Vec<f64>] {
        &self.per_slot
    }

    /// Per-slot effective sample sizes.
    pub fn ess(&self) -> &[f64] {
        &self.ess
    }

    /// The final weight row (after the last covered slot), or uniform
    /// ones if no slot was covered.
    pub fn final_weights(&self, n_particles: usize) -> Vec<f64> {
        self.per_slot
            .last()
            .cloned()
            .unwrap_or_else(|| vec![1.0; n_particles])
    }
}

/// Computes the non-resampling filter's cumulative weights over a finished
/// forecast: at each covered observation slot the per-particle likelihood
/// of the predicted `var` value is multiplied into the running product.
/// Missing slots contribute a factor of 1, leaving the row identical to
/// the previous one.
///
/// # Errors
///
/// Returns [`FilterError`] if a covered slot's forecast step is out of
/// range (cannot happen for slots within the tensor horizon).
pub fn cumulative_weights(
    output: &ForecastOutput,
    observations: &ObservationSeries,
    var: OutputVar,
) -> Result<CumulativeWeights, FilterError> {
    let n = output.n_particles();
    let covered = observations
        .slots_for_horizon(output.n_steps())
        .min(observations.n_slots());

    let mut weights = vec![1.0; n];
    let mut per_slot = Vec::with_capacity(covered);
    let mut ess = Vec::with_capacity(covered);

    for slot in 0..covered {
        if let Some(obs) = observations.slot(slot) {
            let step = observations.step_for_slot(slot);
            let predicted = output.var_at(step, var)?;
            update_weights(&mut weights, &predicted, obs)?;
        }
        per_slot.push(weights.clone());
        ess.push(effective_sample_size(&weights));
    }

    Ok(CumulativeWeights { per_slot, ess })
}
