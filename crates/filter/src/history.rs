//! Append-only log of parameter-ensemble snapshots.

use demeter_model::ParamEnsemble;

/// One parameter snapshot, taken at an analysis event.
#[derive(Debug, Clone)]
pub struct ParamSnapshot {
    step: usize,
    resampled: bool,
    params: ParamEnsemble,
}

impl ParamSnapshot {
    /// Forecast step of the analysis event.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Whether resample-move fired at this event.
    pub fn resampled(&self) -> bool {
        self.resampled
    }

    /// The parameter ensemble at the snapshot point.
    pub fn params(&self) -> &ParamEnsemble {
        &self.params
    }
}

/// Append-only history of parameter ensembles, one entry per analysis
/// event with a non-missing observation.
///
/// Snapshots are taken after the resample decision: when resample-move
/// fires, the entry holds the post-move (posterior) parameters the next
/// forecast actually uses. Entries are never mutated after append.
#[derive(Debug, Clone, Default)]
pub struct ParameterHistory {
    snapshots: Vec<ParamSnapshot>,
}

impl ParameterHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot.
    pub fn record(&mut self, step: usize, params: ParamEnsemble, resampled: bool) {
        self.snapshots.push(ParamSnapshot {
            step,
            resampled,
            params,
        });
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[ParamSnapshot] {
        &self.snapshots
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if no snapshot has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of snapshots where resample-move fired.
    pub fn n_resamples(&self) -> usize {
        self.snapshots.iter().filter(|s| s.resampled).count()
    }
}
