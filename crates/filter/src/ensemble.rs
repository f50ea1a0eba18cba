//! The index-aligned (state, parameters, weights) triple.

use demeter_model::{CarbonPools, ParamEnsemble};

use crate::error::FilterError;

/// An ensemble of N particles: carbon-pool state, parameter set, and
/// importance weight per particle, index-aligned at all times.
///
/// The sequential loop owns the ensemble and threads it by value: every
/// forecast or analysis step consumes the previous ensemble and returns a
/// new one, so a step can never alias the ensemble it is reading.
#[derive(Debug, Clone)]
pub struct Ensemble {
    state: Vec<CarbonPools>,
    params: ParamEnsemble,
    weights: Vec<f64>,
}

impl Ensemble {
    /// Builds an ensemble from its three parts.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::LengthMismatch`] if the parts disagree in
    /// length.
    pub fn new(
        state: Vec<CarbonPools>,
        params: ParamEnsemble,
        weights: Vec<f64>,
    ) -> Result<Self, FilterError> {
        let n = params.len();
        if state.len() != n {
            return Err(FilterError::LengthMismatch {
                name: "state",
                expected: n,
                got: state.len(),
            });
        }
        if weights.len() != n {
            return Err(FilterError::LengthMismatch {
                name: "weights",
                expected: n,
                got: weights.len(),
            });
        }
        Ok(Self {
            state,
            params,
            weights,
        })
    }

    /// Builds an ensemble with every weight set to 1 (un-normalized
    /// uniform), the state of a fresh prior draw.
    pub fn with_uniform_weights(
        state: Vec<CarbonPools>,
        params: ParamEnsemble,
    ) -> Result<Self, FilterError> {
        let n = params.len();
        Self::new(state, params, vec![1.0; n])
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the ensemble holds no particles.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Per-particle carbon pools.
    pub fn state(&self) -> &[CarbonPools] {
        &self.state
    }

    /// The parameter ensemble.
    pub fn params(&self) -> &ParamEnsemble {
        &self.params
    }

    /// Per-particle importance weights (un-normalized).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Mutable weights, for the in-crate likelihood update.
    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Decomposes the ensemble into its parts.
    pub fn into_parts(self) -> (Vec<CarbonPools>, ParamEnsemble, Vec<f64>) {
        (self.state, self.params, self.weights)
    }
}
