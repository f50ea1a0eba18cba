//! JSON diagnostics summary of an assimilation run.

use std::path::Path;

use serde::Serialize;

use demeter_filter::AssimilationResult;
use demeter_model::OutputVar;
use demeter_stats::weighted_quantile;

use crate::error::IoError;

/// Top-level assimilation summary.
#[derive(Debug, Serialize)]
pub struct AssimilationSummary {
    /// Ensemble size.
    pub n_particles: usize,
    /// Forecast horizon in steps.
    pub n_steps: usize,
    /// Observation cadence in steps.
    pub cadence: usize,
    /// Name of the observed output variable.
    pub observed: String,
    /// Number of analyses with a non-missing observation.
    pub n_analyses: usize,
    /// Number of analyses where resample-move fired.
    pub n_resamples: usize,
    /// Per-analysis diagnostics, oldest first.
    pub analyses: Vec<AnalysisEntry>,
    /// Weighted quantiles of the final leaf pool.
    pub final_leaf: PoolQuantiles,
    /// Weighted quantiles of the final wood pool.
    pub final_wood: PoolQuantiles,
    /// Weighted quantiles of the final soil pool.
    pub final_soil: PoolQuantiles,
}

/// One analysis event.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisEntry {
    /// Forecast step of the analysis.
    pub step: usize,
    /// Effective sample size after the weight update.
    pub ess: f64,
    /// Whether resample-move fired.
    pub resampled: bool,
}

/// Weighted 95% credible interval plus median for one pool.
#[derive(Debug, Clone, Serialize)]
pub struct PoolQuantiles {
    /// 2.5% quantile.
    pub q025: f64,
    /// Weighted median.
    pub median: f64,
    /// 97.5% quantile.
    pub q975: f64,
}

fn pool_quantiles(values: &[f64], weights: &[f64]) -> PoolQuantiles {
    PoolQuantiles {
        q025: weighted_quantile(values, weights, 0.025),
        median: weighted_quantile(values, weights, 0.5),
        q975: weighted_quantile(values, weights, 0.975),
    }
}

/// Builds the summary from a finished run.
pub fn summarize(
    result: &AssimilationResult,
    cadence: usize,
    observed: OutputVar,
) -> AssimilationSummary {
    let ensemble = result.ensemble();
    let weights = ensemble.weights();
    let leaf: Vec<f64> = ensemble.state().iter().map(|s| s.leaf).collect();
    let wood: Vec<f64> = ensemble.state().iter().map(|s| s.wood).collect();
    let soil: Vec<f64> = ensemble.state().iter().map(|s| s.soil).collect();

    AssimilationSummary {
        n_particles: ensemble.len(),
        n_steps: result.output().n_steps(),
        cadence,
        observed: observed.name().to_string(),
        n_analyses: result.records().len(),
        n_resamples: result.history().n_resamples(),
        analyses: result
            .records()
            .iter()
            .map(|r| AnalysisEntry {
                step: r.step,
                ess: r.ess,
                resampled: r.resampled,
            })
            .collect(),
        final_leaf: pool_quantiles(&leaf, weights),
        final_wood: pool_quantiles(&wood, weights),
        final_soil: pool_quantiles(&soil, weights),
    }
}

/// Writes the summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`IoError::Json`] on serialization failure or a wrapped I/O
/// error on write failure.
pub fn write_summary(path: &Path, summary: &AssimilationSummary) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).map_err(|e| IoError::Json {
        reason: e.to_string(),
    })?;
    Ok(())
}
