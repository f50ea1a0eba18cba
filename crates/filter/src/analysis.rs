//! The per-observation analysis step.

use rand::Rng;
use tracing::debug;

use crate::config::FilterConfig;
use crate::ensemble::Ensemble;
use crate::error::FilterError;
use crate::ess::effective_sample_size;
use crate::observation::Observation;
use crate::resample::resample_move;
use crate::weights::update_weights;

/// Diagnostics from one analysis event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisRecord {
    /// Forecast step the analysis ran at.
    pub step: usize,
    /// Effective sample size after the weight update, before any resample.
    pub ess: f64,
    /// Whether resample-move fired.
    pub resampled: bool,
}

/// Runs one analysis: with no observation the ensemble passes through
/// untouched; with an observation the weights absorb the likelihood of
/// `predicted` (the observed variable's forecast row), and resample-move
/// fires if the effective sample size drops below the configured fraction
/// of N.
///
/// The returned ensemble is always length N and index-aligned, whether or
/// not resampling occurred.
///
/// # Errors
///
/// Returns [`FilterError`] on length mismatches or a failed resample-move.
pub fn analysis_step(
    mut ensemble: Ensemble,
    predicted: &[f64],
    obs: Option<Observation>,
    config: &FilterConfig,
    step: usize,
    rng: &mut impl Rng,
) -> Result<(Ensemble, Option<AnalysisRecord>), FilterError> {
    let Some(obs) = obs else {
        // Missing observation: the designed "skip analysis" signal.
        return Ok((ensemble, None));
    };

    update_weights(ensemble.weights_mut(), predicted, obs)?;

    let n = ensemble.len() as f64;
    let ess = effective_sample_size(ensemble.weights());

    let resampled = config.resample() && ess < config.ess_fraction() * n;
    if resampled {
        debug!(step, ess, "ESS below threshold, resampling");
        ensemble = resample_move(ensemble, config.smoothing(), rng)?;
    }

    Ok((
        ensemble,
        Some(AnalysisRecord {
            step,
            ess,
            resampled,
        }),
    ))
}
